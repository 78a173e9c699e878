//! Page arithmetic and links for the add-on index.

use crate::config::AddonConfig;

/// Default number of add-ons per index page.
pub const DEFAULT_LIMIT: i64 = 50;

/// Largest page size a client may request.
pub const MAX_LIMIT: i64 = 100;

/// Clamp a requested page size into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// One page of the index: which rows to fetch and which links to emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPage {
    /// 1-based page number, clamped to at least 1.
    pub page: i64,
    pub limit: i64,
    pub total_pages: u32,
}

impl IndexPage {
    pub fn new(page: Option<i64>, limit: Option<i64>, total_count: i64) -> Self {
        let limit = clamp_limit(limit);
        let page = page.unwrap_or(1).max(1);
        let total_pages = (total_count.max(0).saturating_add(limit - 1) / limit).max(1);
        Self {
            page,
            limit,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        }
    }

    /// Rows to skip; saturates for absurd page numbers, which then list nothing.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn previous_link(&self, config: &AddonConfig) -> Option<String> {
        (self.page > 1).then(|| self.link(config, self.page - 1))
    }

    pub fn next_link(&self, config: &AddonConfig) -> Option<String> {
        (self.page < i64::from(self.total_pages)).then(|| self.link(config, self.page + 1))
    }

    fn link(&self, config: &AddonConfig, page: i64) -> String {
        format!(
            "{}api/v1/repos/addons?page={page}&limit={}",
            config.app_url, self.limit
        )
    }
}
