//! Row styling configuration.
//!
//! Distinct styles for pinned, permalinked and hovered rows, the gutter,
//! the popover and the status line.

use crate::state::RenderedRow;
use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Determines whether colors should be enabled or disabled based on:
/// - `--no-color` CLI flag
/// - `NO_COLOR` environment variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Create a ColorConfig from CLI args and environment.
    ///
    /// The flag wins; otherwise any `NO_COLOR` value disables colors.
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var_os("NO_COLOR").is_none();
        Self { enabled }
    }

    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== RowStyles =====

/// Styles used when painting rows.
///
/// Without colors, emphasis falls back to modifiers only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowStyles {
    pub message: Style,
    pub pinned: Style,
    pub permalinked: Style,
    pub hovered: Style,
    pub gutter: Style,
    pub popover: Style,
    pub status: Style,
}

impl RowStyles {
    pub fn with_color_config(config: ColorConfig) -> Self {
        if config.colors_enabled() {
            Self {
                message: Style::default(),
                pinned: Style::default().fg(Color::Yellow),
                permalinked: Style::default().fg(Color::Cyan),
                hovered: Style::default().add_modifier(Modifier::BOLD),
                gutter: Style::default().fg(Color::DarkGray),
                popover: Style::default().fg(Color::White).bg(Color::Blue),
                status: Style::default().fg(Color::Black).bg(Color::Gray),
            }
        } else {
            Self {
                message: Style::default(),
                pinned: Style::default().add_modifier(Modifier::BOLD),
                permalinked: Style::default().add_modifier(Modifier::UNDERLINED),
                hovered: Style::default().add_modifier(Modifier::BOLD),
                gutter: Style::default(),
                popover: Style::default().add_modifier(Modifier::REVERSED),
                status: Style::default().add_modifier(Modifier::REVERSED),
            }
        }
    }

    /// Message style for one row. Pinned beats permalinked beats hovered.
    pub fn row_style(&self, row: &RenderedRow, hovered: bool) -> Style {
        if row.pinned {
            self.pinned
        } else if row.permalinked {
            self.permalinked
        } else if hovered {
            self.hovered
        } else {
            self.message
        }
    }
}

impl Default for RowStyles {
    fn default() -> Self {
        Self::with_color_config(ColorConfig::from_env_and_args(false))
    }
}
