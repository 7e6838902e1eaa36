//! Markdown rendering for blog posts.
//!
//! Post bodies are written in the admin panel as GitHub-flavored markdown.
//! Raw HTML in a body is dropped rather than passed through.

use comrak::{Options, markdown_to_html};

/// Render a post body to HTML.
#[must_use]
pub fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    // Enable GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.header_ids = Some("section-".to_string());
    options.extension.footnotes = true;

    options.render.r#unsafe = false;

    markdown_to_html(content, &options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_gfm() {
        let html = render_markdown("## Financing\n\n~~18%~~ **14.9%** a year\n\n| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<h2"));
        assert!(html.contains("<del>18%</del>"));
        assert!(html.contains("<strong>14.9%</strong>"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_raw_html_is_dropped() {
        let html = render_markdown("Hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
    }
}
