//! Display styles: terminal colors per message type and the chart palette.
//!
//! Styles are data, not code. The defaults ship as `styles/default.toml` and
//! can be replaced at runtime with `--styles-file`.

use std::fs;
use std::path::Path;

use colored::Color;
use serde::Deserialize;
use thiserror::Error;

/// Terminal color for one `dhcp_type` label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypeStyle {
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Styles {
    /// Chart bar colors as `#RRGGBB`, assigned to bars in order and cycled.
    pub palette: Vec<String>,
    #[serde(rename = "type", default)]
    pub types: Vec<TypeStyle>,
}

/// Errors returned when loading a styles file.
#[derive(Debug, Error)]
pub enum StyleLoadError {
    #[error("failed to read styles file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse styles file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("styles file {path}: unknown terminal color '{color}' for type '{label}'")]
    TerminalColor {
        path: String,
        label: String,
        color: String,
    },
    #[error("styles file {path}: palette entry '{entry}' is not #RRGGBB")]
    PaletteColor { path: String, entry: String },
    #[error("styles file {path}: palette is empty")]
    EmptyPalette { path: String },
}

impl Styles {
    /// Terminal color for a message-type label, if one is configured.
    pub fn color_for(&self, label: &str) -> Option<Color> {
        self.types
            .iter()
            .find(|style| style.label == label)
            .and_then(|style| parse_terminal_color(&style.color))
    }

    /// Palette color for the bar at `index`, cycling when there are more bars than colors.
    pub fn bar_color(&self, index: usize) -> &str {
        if self.palette.is_empty() {
            return "#9E9E9E";
        }
        &self.palette[index % self.palette.len()]
    }
}

/// Load styles from a TOML file.
pub fn load_styles(path: &Path) -> Result<Styles, StyleLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| StyleLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_styles(&raw, path.display().to_string())
}

/// Built-in styles.
pub fn default_styles() -> Styles {
    let embedded = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/styles/default.toml"));
    parse_styles(embedded, "embedded styles".to_string()).unwrap_or_else(|_| fallback_styles())
}

fn parse_styles(raw: &str, path: String) -> Result<Styles, StyleLoadError> {
    let styles: Styles = toml::from_str(raw).map_err(|source| StyleLoadError::Parse {
        path: path.clone(),
        source,
    })?;

    if styles.palette.is_empty() {
        return Err(StyleLoadError::EmptyPalette { path });
    }
    if let Some(entry) = styles
        .palette
        .iter()
        .find(|entry| parse_hex_color(entry).is_none())
    {
        return Err(StyleLoadError::PaletteColor {
            path,
            entry: entry.clone(),
        });
    }
    if let Some(style) = styles
        .types
        .iter()
        .find(|style| parse_terminal_color(&style.color).is_none())
    {
        return Err(StyleLoadError::TerminalColor {
            path,
            label: style.label.clone(),
            color: style.color.clone(),
        });
    }

    Ok(styles)
}

fn fallback_styles() -> Styles {
    let style = |label: &str, color: &str| TypeStyle {
        label: label.to_string(),
        color: color.to_string(),
    };
    Styles {
        palette: ["#4CAF50", "#2196F3", "#FFEB3B", "#9C27B0", "#F44336", "#F44336", "#9E9E9E"]
            .iter()
            .map(|hex| hex.to_string())
            .collect(),
        types: vec![
            style("Discover", "bright green"),
            style("Offer", "bright blue"),
            style("Request", "bright yellow"),
            style("Ack", "bright magenta"),
            style("Decline", "bright red"),
            style("Nak", "bright red"),
            style("Unknown", "bright black"),
        ],
    }
}

/// Parse a named ANSI color (`red`, `bright blue`, `bright_black`, ...).
pub fn parse_terminal_color(name: &str) -> Option<Color> {
    let normalized = name.trim().to_ascii_lowercase().replace(['_', '-'], " ");
    let color = match normalized.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" | "purple" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "bright black" | "gray" | "grey" => Color::BrightBlack,
        "bright red" => Color::BrightRed,
        "bright green" => Color::BrightGreen,
        "bright yellow" => Color::BrightYellow,
        "bright blue" => Color::BrightBlue,
        "bright magenta" | "bright purple" => Color::BrightMagenta,
        "bright cyan" => Color::BrightCyan,
        "bright white" => Color::BrightWhite,
        hex if hex.starts_with('#') => {
            let (r, g, b) = parse_hex_color(hex)?;
            Color::TrueColor { r, g, b }
        }
        _ => return None,
    };
    Some(color)
}

/// Parse `#RRGGBB` into its components.
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
