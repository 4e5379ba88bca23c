//! Per-call render configuration.

use merview_config::{SecurityLevel, Theme};

/// Renderer configuration passed into every render call.
///
/// A renderer holds no global state: changing the theme means building new
/// options, which affects only renders issued afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub theme: Theme,
    pub security_level: SecurityLevel,
}

impl RenderOptions {
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Mermaid `%%{init}%%` directive carrying these options.
    ///
    /// HTML labels are disabled so node text is plain SVG, which keeps
    /// rasterized exports readable.
    #[must_use]
    pub fn init_directive(&self) -> String {
        format!(
            r#"%%{{init: {{"theme": "{}", "securityLevel": "{}", "htmlLabels": false, "flowchart": {{"htmlLabels": false}}}}}}%%"#,
            self.theme, self.security_level
        )
    }

    /// `source` with the init directive prepended.
    #[must_use]
    pub fn apply_to(&self, source: &str) -> String {
        format!("{}\n{source}", self.init_directive())
    }
}
