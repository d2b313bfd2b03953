//! Display configuration threaded into render calls.

/// Host settings key for the suffix toggle.
pub const SHOW_SUFFIX_KEY: &str = "arch.m16c.showSuffix";

/// Description of a boolean host setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SettingSpec {
    /// Settings registry key.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub key: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Value type; always `"boolean"` here.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: &'static str,
    /// Default value.
    pub default: bool,
}

/// The `:G/:Q/:S/:Z` suffix toggle as registered with the host.
pub const SHOW_SUFFIX_SETTING: SettingSpec = SettingSpec {
    key: SHOW_SUFFIX_KEY,
    title: "M16C Disassembly Suffix",
    description: "Whether or not to display the :G/:Q/:S/:Z suffix.",
    kind: "boolean",
    default: true,
};

/// Renderer options. Read once per render call and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct DisplayConfig {
    /// Emit the instruction format suffix (`:G`, `:Q`, `:S`, `:Z`).
    pub show_suffix: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_suffix: SHOW_SUFFIX_SETTING.default,
        }
    }
}

impl DisplayConfig {
    /// Returns a copy with the suffix toggle set to `show_suffix`.
    #[must_use]
    pub const fn with_suffix(self, show_suffix: bool) -> Self {
        Self { show_suffix }
    }
}

#[cfg(test)]
mod tests {
    use super::{DisplayConfig, SHOW_SUFFIX_KEY, SHOW_SUFFIX_SETTING};

    #[test]
    fn suffix_defaults_to_shown() {
        assert!(DisplayConfig::default().show_suffix);
        assert!(SHOW_SUFFIX_SETTING.default);
        assert_eq!(SHOW_SUFFIX_SETTING.key, SHOW_SUFFIX_KEY);
        assert_eq!(SHOW_SUFFIX_SETTING.kind, "boolean");
    }

    #[test]
    fn with_suffix_toggles_only_the_flag() {
        let hidden = DisplayConfig::default().with_suffix(false);
        assert!(!hidden.show_suffix);
        assert_eq!(hidden.with_suffix(true), DisplayConfig::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn setting_serializes_to_host_schema() {
        let json = serde_json::to_value(SHOW_SUFFIX_SETTING).expect("setting serializes");
        assert_eq!(
            json,
            serde_json::json!({
                "title": "M16C Disassembly Suffix",
                "description": "Whether or not to display the :G/:Q/:S/:Z suffix.",
                "type": "boolean",
                "default": true,
            })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: DisplayConfig = serde_json::from_str("{}").expect("empty object parses");
        assert_eq!(config, DisplayConfig::default());
        let config: DisplayConfig =
            serde_json::from_str(r#"{"showSuffix":false}"#).expect("toggle parses");
        assert!(!config.show_suffix);
    }
}
