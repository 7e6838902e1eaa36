//! Data table component types.
//!
//! These types describe the list pages of the admin panel: columns, the
//! toolbar filters, and the empty state. Rows are rendered by each page's
//! template; `components/table_toolbar.html` renders the toolbar.

use std::str::FromStr;

use serde::Deserialize;

use showroom_core::{LeadStatus, VehicleStatus};

/// Column definition for a data table.
#[derive(Debug, Clone)]
pub struct TableColumn {
    /// Unique key for the column.
    pub key: String,
    /// Display label for the column header.
    pub label: String,
    /// Right-align numeric cells.
    pub numeric: bool,
}

impl TableColumn {
    /// Create a new text column.
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            numeric: false,
        }
    }

    /// Create a right-aligned numeric column.
    #[must_use]
    pub fn numeric(key: &str, label: &str) -> Self {
        Self {
            numeric: true,
            ..Self::new(key, label)
        }
    }
}

/// Filter type for data tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    /// Text input filter.
    Text,
    /// Single-select dropdown.
    Select,
}

/// Filter definition for a data table.
#[derive(Debug, Clone)]
pub struct TableFilter {
    /// Query parameter key.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Filter type.
    pub filter_type: FilterType,
    /// Placeholder text (for text inputs).
    pub placeholder: Option<String>,
    /// Available options (for selects).
    pub options: Vec<FilterOption>,
}

/// Option for select filters.
#[derive(Debug, Clone)]
pub struct FilterOption {
    /// Option value.
    pub value: String,
    /// Display label.
    pub label: String,
}

impl FilterOption {
    /// Create a new filter option.
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

impl TableFilter {
    /// Create a text filter.
    #[must_use]
    pub fn text(key: &str, label: &str, placeholder: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Text,
            placeholder: Some(placeholder.to_string()),
            options: vec![],
        }
    }

    /// Create a select filter. An empty "All" option is prepended.
    #[must_use]
    pub fn select(key: &str, label: &str, options: Vec<FilterOption>) -> Self {
        let mut all = vec![FilterOption::new("", "All")];
        all.extend(options);
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Select,
            placeholder: None,
            options: all,
        }
    }

    #[must_use]
    pub fn is_select(&self) -> bool {
        self.filter_type == FilterType::Select
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone)]
pub struct DataTableConfig {
    /// Unique table identifier.
    pub table_id: String,
    /// Page path the toolbar form submits to.
    pub action: String,
    /// Link for the "New" button, if the resource can be created.
    pub new_href: Option<String>,
    /// Column definitions.
    pub columns: Vec<TableColumn>,
    /// Filter definitions.
    pub filters: Vec<TableFilter>,
    /// Title for empty state.
    pub empty_title: String,
    /// Description for empty state.
    pub empty_description: Option<String>,
}

impl DataTableConfig {
    /// Create a new data table configuration.
    #[must_use]
    pub fn new(table_id: &str, action: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            action: action.to_string(),
            new_href: None,
            columns: vec![],
            filters: vec![],
            empty_title: "No items found".to_string(),
            empty_description: None,
        }
    }

    /// Add a column.
    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(mut self, filter: TableFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Show a "New" button linking to `href`.
    #[must_use]
    pub fn new_button(mut self, href: &str) -> Self {
        self.new_href = Some(href.to_string());
        self
    }

    /// Set empty state configuration.
    #[must_use]
    pub fn empty_state(mut self, title: &str, description: Option<&str>) -> Self {
        self.empty_title = title.to_string();
        self.empty_description = description.map(ToString::to_string);
        self
    }

    #[must_use]
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }
}

/// Toolbar state from the query string: `?q=...&status=...`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ListQuery {
    /// Trimmed search text, empty when absent.
    #[must_use]
    pub fn search(&self) -> &str {
        self.q.as_deref().map_or("", str::trim)
    }

    /// Lowercased search text for case-insensitive matching.
    #[must_use]
    pub fn needle(&self) -> String {
        self.search().to_lowercase()
    }

    /// Parsed status filter. Blank or unknown values mean "all".
    #[must_use]
    pub fn status_as<T: FromStr>(&self) -> Option<T> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok())
    }

    /// Current value of a toolbar field, for re-filling the form.
    #[must_use]
    pub fn value(&self, key: &str) -> &str {
        match key {
            "q" => self.search(),
            "status" => self.status.as_deref().unwrap_or(""),
            _ => "",
        }
    }
}

/// Visibility filter shared by the approve/publish style tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    #[must_use]
    pub const fn allows(self, visible: bool) -> bool {
        matches!((self, visible), (Self::Visible, true) | (Self::Hidden, false))
    }
}

impl FromStr for Visibility {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visible" => Ok(Self::Visible),
            "hidden" => Ok(Self::Hidden),
            _ => Err(()),
        }
    }
}

fn search_filter(placeholder: &str) -> TableFilter {
    TableFilter::text("q", "Search", placeholder)
}

fn visibility_filter(visible: &str, hidden: &str) -> TableFilter {
    TableFilter::select(
        "status",
        "Status",
        vec![
            FilterOption::new("visible", visible),
            FilterOption::new("hidden", hidden),
        ],
    )
}

/// Build the vehicles table configuration.
#[must_use]
pub fn vehicles_table_config() -> DataTableConfig {
    DataTableConfig::new("vehicles", "/admin/vehicles")
        .new_button("/admin/vehicles/new")
        .column(TableColumn::new("vehicle", "Vehicle"))
        .column(TableColumn::numeric("price", "Price"))
        .column(TableColumn::numeric("mileage", "Mileage (km)"))
        .column(TableColumn::new("fuel", "Fuel"))
        .column(TableColumn::new("status", "Status"))
        .column(TableColumn::new("featured", "Featured"))
        .filter(search_filter("Make, model, color..."))
        .filter(TableFilter::select(
            "status",
            "Status",
            VehicleStatus::ALL
                .iter()
                .map(|s| FilterOption::new(s.as_str(), s.label()))
                .collect(),
        ))
        .empty_state(
            "No vehicles found",
            Some("Try adjusting your search or add a vehicle"),
        )
}

/// Build the promotions table configuration.
#[must_use]
pub fn promotions_table_config() -> DataTableConfig {
    DataTableConfig::new("promotions", "/admin/promotions")
        .new_button("/admin/promotions/new")
        .column(TableColumn::new("title", "Title"))
        .column(TableColumn::new("discount", "Discount"))
        .column(TableColumn::new("window", "Runs"))
        .column(TableColumn::new("state", "State"))
        .filter(search_filter("Title or description..."))
        .filter(visibility_filter("Active", "Inactive"))
        .empty_state("No promotions found", None)
}

/// Build the testimonials table configuration.
#[must_use]
pub fn testimonials_table_config() -> DataTableConfig {
    DataTableConfig::new("testimonials", "/admin/testimonials")
        .new_button("/admin/testimonials/new")
        .column(TableColumn::new("customer", "Customer"))
        .column(TableColumn::new("rating", "Rating"))
        .column(TableColumn::new("content", "Testimonial"))
        .column(TableColumn::new("received", "Received"))
        .column(TableColumn::new("state", "State"))
        .filter(search_filter("Customer or text..."))
        .filter(visibility_filter("Approved", "Awaiting approval"))
        .empty_state("No testimonials found", None)
}

/// Build the blog posts table configuration.
#[must_use]
pub fn posts_table_config() -> DataTableConfig {
    DataTableConfig::new("posts", "/admin/blog")
        .new_button("/admin/blog/new")
        .column(TableColumn::new("title", "Title"))
        .column(TableColumn::new("author", "Author"))
        .column(TableColumn::numeric("likes", "Likes"))
        .column(TableColumn::numeric("comments", "Comments"))
        .column(TableColumn::new("state", "State"))
        .filter(search_filter("Title or tag..."))
        .filter(visibility_filter("Published", "Draft"))
        .empty_state("No posts found", Some("Write the first post"))
}

/// Build the comment moderation table configuration.
#[must_use]
pub fn comments_table_config() -> DataTableConfig {
    DataTableConfig::new("comments", "/admin/blog/comments")
        .column(TableColumn::new("author", "Author"))
        .column(TableColumn::new("post", "Post"))
        .column(TableColumn::new("content", "Comment"))
        .column(TableColumn::new("created", "Received"))
        .column(TableColumn::new("state", "State"))
        .filter(search_filter("Author or text..."))
        .filter(visibility_filter("Approved", "Pending"))
        .empty_state("No comments to moderate", None)
}

/// Build the media library table configuration.
#[must_use]
pub fn media_table_config() -> DataTableConfig {
    DataTableConfig::new("media", "/admin/media")
        .column(TableColumn::new("preview", "Preview"))
        .column(TableColumn::new("file", "File"))
        .column(TableColumn::numeric("size", "Size"))
        .column(TableColumn::new("alt", "Alt text"))
        .filter(search_filter("File name or alt text..."))
        .empty_state("No media uploaded yet", None)
}

/// Build the contacts (leads) table configuration.
#[must_use]
pub fn contacts_table_config() -> DataTableConfig {
    DataTableConfig::new("contacts", "/admin/leads")
        .column(TableColumn::new("name", "Name"))
        .column(TableColumn::new("reach", "Email / Phone"))
        .column(TableColumn::new("message", "Message"))
        .column(TableColumn::new("received", "Received"))
        .column(TableColumn::new("status", "Status"))
        .filter(search_filter("Name, email or message..."))
        .filter(TableFilter::select(
            "status",
            "Status",
            LeadStatus::ALL
                .iter()
                .map(|s| FilterOption::new(s.as_str(), s.label()))
                .collect(),
        ))
        .empty_state("No contact requests", None)
}
