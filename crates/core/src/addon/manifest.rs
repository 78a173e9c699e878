//! The `info` manifest at the root of every add-on repository.

use serde::{Deserialize, Serialize};

/// Path of the manifest file relative to the repository root.
pub const MANIFEST_PATH: &str = "info";

/// Parsed contents of the `info` manifest.
///
/// Every field is optional in the file and defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddonManifest {
    pub title: String,
    pub license: String,
    /// Dependency identifiers in `{name}_{id}` form.
    pub dependencies: Vec<String>,
}

impl AddonManifest {
    /// Parse manifest text.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Check that the text fields are single-line, so the manifest can be
    /// published in the add-on index.
    pub fn validate(&self) -> Result<(), String> {
        let single_line = |field: &str, value: &str| {
            if value.chars().any(char::is_control) {
                Err(format!("{field} {value:?} contains a control character"))
            } else {
                Ok(())
            }
        };
        single_line("title", &self.title)?;
        single_line("license", &self.license)?;
        self.dependencies
            .iter()
            .try_for_each(|dep| single_line("dependency", dep))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_manifest() {
        let m = AddonManifest::parse(
            r#"{"title": "Forest Island", "license": "GPL-3.0", "dependencies": ["tiles_3"]}"#,
        )
        .unwrap();
        assert_eq!(m.title, "Forest Island");
        assert_eq!(m.license, "GPL-3.0");
        assert_eq!(m.dependencies, vec!["tiles_3".to_string()]);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let m = AddonManifest::parse(r#"{"title": "Bare"}"#).unwrap();
        assert_eq!(m.title, "Bare");
        assert!(m.license.is_empty());
        assert!(m.dependencies.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let m = AddonManifest::parse(r#"{"title": "X", "version": 3}"#).unwrap();
        assert_eq!(m.title, "X");
    }

    #[test]
    fn control_characters_fail_validation() {
        let m = AddonManifest::parse(r#"{"title": "Forest\nIsland"}"#).unwrap();
        let reason = m.validate().unwrap_err();
        assert!(reason.starts_with("title"));

        let m = AddonManifest::parse(r#"{"title": "Say \"hi\"", "license": "GPL\\2"}"#).unwrap();
        assert!(m.validate().is_ok());
    }

    #[test]
    fn malformed_text_is_an_error() {
        assert!(AddonManifest::parse("(supertux-addon)").is_err());
        assert!(AddonManifest::parse(r#"{"dependencies": "not-a-list"}"#).is_err());
    }
}
