use std::path::PathBuf;

/// Registry configuration threaded into the regeneration engine and the
/// descriptor converter.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct AddonConfig {
    /// Public base URL of the forge, with a trailing slash (default: `http://localhost:3000/`).
    pub app_url: String,
    /// Directory that archive-relative paths are resolved against (default: `data/repo-archive`).
    pub archive_root: PathBuf,
    /// Deepest dependency chain resolved below a top-level add-on (default: `8`).
    pub max_dependency_depth: usize,
    /// Organisation whose repositories are never listed as add-ons (default: `supertux`).
    pub reserved_owner: String,
}

impl Default for AddonConfig {
    fn default() -> Self {
        Self {
            app_url: "http://localhost:3000/".into(),
            archive_root: PathBuf::from("data/repo-archive"),
            max_dependency_depth: 8,
            reserved_owner: "supertux".into(),
        }
    }
}

impl AddonConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                   |
    /// |------------------------------|---------------------------|
    /// | `APP_URL`                    | `http://localhost:3000/`  |
    /// | `ARCHIVE_ROOT`               | `data/repo-archive`       |
    /// | `ADDON_MAX_DEPENDENCY_DEPTH` | `8`                       |
    /// | `ADDON_RESERVED_OWNER`       | `supertux`                |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mut app_url = std::env::var("APP_URL").unwrap_or(defaults.app_url);
        if !app_url.ends_with('/') {
            app_url.push('/');
        }

        let archive_root = std::env::var("ARCHIVE_ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.archive_root);

        let max_dependency_depth: usize = std::env::var("ADDON_MAX_DEPENDENCY_DEPTH")
            .unwrap_or_else(|_| "8".into())
            .parse()
            .expect("ADDON_MAX_DEPENDENCY_DEPTH must be a valid usize");

        let reserved_owner =
            std::env::var("ADDON_RESERVED_OWNER").unwrap_or(defaults.reserved_owner);

        Self {
            app_url,
            archive_root,
            max_dependency_depth,
            reserved_owner,
        }
    }

    /// The base URL without its trailing slash.
    pub fn app_url_trimmed(&self) -> &str {
        self.app_url.trim_end_matches('/')
    }
}
