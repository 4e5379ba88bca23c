//! Toolbar controls and their actions.

use std::fmt;
use std::path::PathBuf;

use crate::error::PlatformError;
use crate::measure::Dimensions;
use crate::platform::Platform;
use crate::raster::svg_to_png;

/// Raster actions export at 100%.
const EXPORT_SCALE: f32 = 1.0;

/// One of the four toolbar buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarAction {
    CopyCode,
    CopyImage,
    ExportPng,
    ExportSvg,
}

impl ToolbarAction {
    /// Toolbar order.
    pub const ALL: [ToolbarAction; 4] = [
        ToolbarAction::CopyCode,
        ToolbarAction::CopyImage,
        ToolbarAction::ExportPng,
        ToolbarAction::ExportSvg,
    ];

    /// Button label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::CopyCode => "Copy Code",
            Self::CopyImage => "Copy Image (100%)",
            Self::ExportPng => "Export PNG (100%)",
            Self::ExportSvg => "Export SVG",
        }
    }

    /// Value of the button's `data-action` attribute.
    #[must_use]
    pub fn data_action(self) -> &'static str {
        match self {
            Self::CopyCode => "copy-code",
            Self::CopyImage => "copy-image",
            Self::ExportPng => "export-png",
            Self::ExportSvg => "export-svg",
        }
    }

    /// Parse a `data-action` value.
    #[must_use]
    pub fn from_data_action(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.data_action() == value)
    }

    /// Notice shown when the action fails.
    fn failure_notice(self) -> &'static str {
        match self {
            Self::CopyCode => "Failed to copy text",
            Self::CopyImage => "Failed to copy image",
            Self::ExportPng => "Failed to export image",
            Self::ExportSvg => "Failed to export SVG",
        }
    }
}

impl fmt::Display for ToolbarAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.data_action())
    }
}

/// What a successful render leaves for the toolbar to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmedControls {
    /// Diagram source as given to the renderer.
    pub source: String,
    /// SVG markup exactly as returned by the backend.
    pub markup: String,
    /// Diagram id, used as the export file stem.
    pub id: String,
    /// Measured size, used for raster actions.
    pub dimensions: Dimensions,
}

/// Toolbar state.
///
/// Controls are created for every render but only armed when it succeeds; a
/// failed diagram has nothing to copy or export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Controls {
    Armed(ArmedControls),
    Inert,
}

/// Result of clicking a toolbar button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Content was placed on the clipboard.
    Copied,
    /// A file was written.
    Saved(PathBuf),
    /// The action failed; the user was notified.
    Failed(String),
    /// Controls are inert; nothing happened.
    Inactive,
}

impl ActionOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Copied | Self::Saved(_))
    }
}

/// A rendered diagram with its toolbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedWidget {
    pub controls: Controls,
}

impl RenderedWidget {
    #[must_use]
    pub fn armed(controls: ArmedControls) -> Self {
        Self {
            controls: Controls::Armed(controls),
        }
    }

    #[must_use]
    pub fn inert() -> Self {
        Self {
            controls: Controls::Inert,
        }
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        matches!(self.controls, Controls::Armed(_))
    }

    /// Diagram id, if the render succeeded.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match &self.controls {
            Controls::Armed(armed) => Some(&armed.id),
            Controls::Inert => None,
        }
    }

    /// Perform a toolbar action.
    ///
    /// Failures never propagate: the user gets a notice and the outcome
    /// carries the reason.
    pub fn click(&self, action: ToolbarAction, platform: &dyn Platform) -> ActionOutcome {
        let Controls::Armed(armed) = &self.controls else {
            tracing::debug!(%action, "ignoring click on inert toolbar");
            return ActionOutcome::Inactive;
        };

        match perform(armed, action, platform) {
            Ok((outcome, notice)) => {
                platform.notify(&notice);
                outcome
            }
            Err(e) => {
                tracing::warn!(%action, id = %armed.id, error = %e, "toolbar action failed");
                platform.notify(action.failure_notice());
                ActionOutcome::Failed(e.to_string())
            }
        }
    }
}

fn perform(
    armed: &ArmedControls,
    action: ToolbarAction,
    platform: &dyn Platform,
) -> Result<(ActionOutcome, String), PlatformError> {
    let dims = armed.dimensions;
    match action {
        ToolbarAction::CopyCode => {
            platform.write_text(&armed.source)?;
            Ok((
                ActionOutcome::Copied,
                "Mermaid code copied to clipboard".to_owned(),
            ))
        }
        ToolbarAction::CopyImage => {
            let image = svg_to_png(&armed.markup, Some(dims), EXPORT_SCALE)?;
            platform.write_image(&image)?;
            Ok((ActionOutcome::Copied, format!("Image copied ({dims})")))
        }
        ToolbarAction::ExportPng => {
            let image = svg_to_png(&armed.markup, Some(dims), EXPORT_SCALE)?;
            let name = format!("{}_{}x{}.png", armed.id, dims.width, dims.height);
            let path = platform.save_file(&name, &image.png)?;
            Ok((ActionOutcome::Saved(path), format!("Image exported ({dims})")))
        }
        ToolbarAction::ExportSvg => {
            let name = format!("{}.svg", armed.id);
            let path = platform.save_file(&name, armed.markup.as_bytes())?;
            Ok((ActionOutcome::Saved(path), "SVG exported".to_owned()))
        }
    }
}
