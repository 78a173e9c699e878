use addonhub_core::addon::pagination::clamp_limit;
use addonhub_core::config::AddonConfig;

/// Configuration for one indexer run.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub database_url: String,
    /// 1-based page to render.
    pub page: i64,
    /// Entries per page, clamped to `1..=100`.
    pub limit: i64,
    pub addon: AddonConfig,
}

impl IndexerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var        | Default    |
    /// |----------------|------------|
    /// | `DATABASE_URL` | (required) |
    /// | `INDEX_PAGE`   | `1`        |
    /// | `INDEX_LIMIT`  | `50`       |
    ///
    /// plus everything [`AddonConfig::from_env`] reads.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let page: i64 = std::env::var("INDEX_PAGE")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("INDEX_PAGE must be a valid i64");

        let limit: i64 = std::env::var("INDEX_LIMIT")
            .unwrap_or_else(|_| "50".into())
            .parse()
            .expect("INDEX_LIMIT must be a valid i64");

        Self {
            database_url,
            page: page.max(1),
            limit: clamp_limit(Some(limit)),
            addon: AddonConfig::from_env(),
        }
    }
}
