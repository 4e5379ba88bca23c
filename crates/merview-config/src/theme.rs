//! Diagram theme and renderer security level.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Diagram color theme understood by the mermaid renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Forest,
    Neutral,
}

impl Theme {
    /// All themes, in display order.
    pub const ALL: [Theme; 4] = [Theme::Default, Theme::Dark, Theme::Forest, Theme::Neutral];

    /// Name as used in configuration and by the renderer.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dark => "dark",
            Self::Forest => "forest",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "unknown theme '{s}', expected one of: default, dark, forest, neutral"
                ))
            })
    }
}

/// How much the renderer trusts diagram source.
///
/// Mirrors mermaid's `securityLevel`. `Loose` allows click handlers and HTML
/// labels, which preview output relies on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    Strict,
    #[default]
    Loose,
    Antiscript,
    Sandbox,
}

impl SecurityLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Loose => "loose",
            Self::Antiscript => "antiscript",
            Self::Sandbox => "sandbox",
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_str() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" Forest ".parse::<Theme>().unwrap(), Theme::Forest);
        assert_eq!("default".parse::<Theme>().unwrap(), Theme::Default);
    }

    #[test]
    fn test_theme_from_str_unknown() {
        let err = "solarized".parse::<Theme>().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("solarized"));
    }

    #[test]
    fn test_theme_display_matches_serde() {
        #[derive(Deserialize)]
        struct Wrapper {
            theme: Theme,
        }

        for theme in Theme::ALL {
            let parsed: Wrapper = toml::from_str(&format!("theme = \"{theme}\"")).unwrap();
            assert_eq!(parsed.theme, theme);
        }
    }

    #[test]
    fn test_security_level_default_is_loose() {
        assert_eq!(SecurityLevel::default(), SecurityLevel::Loose);
        assert_eq!(SecurityLevel::Antiscript.to_string(), "antiscript");
    }
}
