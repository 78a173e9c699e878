//! Screenshot discovery from a repository tree listing.

use crate::addon::ports::TreeEntry;

/// Directory (with trailing separator) that screenshots live in.
pub const SCREENSHOTS_DIR: &str = "screenshots/";

/// Collect screenshot file names found directly under `screenshots/`.
///
/// Directory entries, files in subdirectories and names without an
/// extension separator are skipped. Discovery order is preserved.
pub fn discover_screenshots(entries: &[TreeEntry]) -> Vec<String> {
    entries
        .iter()
        .filter(|entry| !entry.is_dir)
        .filter_map(|entry| entry.path.strip_prefix(SCREENSHOTS_DIR))
        .filter(|name| name.contains('.') && !name.contains('/'))
        .map(str::to_string)
        .collect()
}
