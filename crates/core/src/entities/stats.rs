//! Visitor statistics aggregated by the backend.

use serde::{Deserialize, Serialize};

/// Visit counter for a single public page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageVisits {
    pub page: String,
    pub visits: u64,
}

/// Site-wide visitor statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorStats {
    #[serde(default)]
    pub total_visits: u64,
    #[serde(default)]
    pub pages: Vec<PageVisits>,
}

impl VisitorStats {
    /// Pages ordered by visits, busiest first; ties keep page-name order.
    #[must_use]
    pub fn ranked(&self) -> Vec<PageVisits> {
        let mut pages = self.pages.clone();
        pages.sort_by(|a, b| b.visits.cmp(&a.visits).then_with(|| a.page.cmp(&b.page)));
        pages
    }

    /// Share of all visits for one page, as a whole percentage.
    #[must_use]
    pub fn share_percent(&self, page: &PageVisits) -> u64 {
        if self.total_visits == 0 {
            0
        } else {
            page.visits * 100 / self.total_visits
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_and_share() {
        let stats = VisitorStats {
            total_visits: 200,
            pages: vec![
                PageVisits { page: "/blog".to_string(), visits: 50 },
                PageVisits { page: "/".to_string(), visits: 120 },
                PageVisits { page: "/about".to_string(), visits: 50 },
            ],
        };
        let ranked = stats.ranked();
        assert_eq!(ranked[0].page, "/");
        assert_eq!(ranked[1].page, "/about");
        assert_eq!(stats.share_percent(&ranked[0]), 60);
        assert_eq!(VisitorStats::default().share_percent(&ranked[0]), 0);
    }
}
