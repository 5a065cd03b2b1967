use serde::{Deserialize, Serialize};

/// Bar color picked in the task table.
///
/// `Default` means "no explicit choice": the caller assigns a color based on
/// the task's project (see [`project_color`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorChoice {
    #[default]
    Default,
    Green,
    Blue,
    Purple,
    Yellow,
    Orange,
    Red,
    Cyan,
    Gray,
}

impl ColorChoice {
    /// Parse a palette label. Anything outside the palette is `Default`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "green" | "verde" | "#2ecc71" => ColorChoice::Green,
            "blue" | "azul" | "#3498db" => ColorChoice::Blue,
            "purple" | "morado" | "#9b59b6" => ColorChoice::Purple,
            "yellow" | "amarillo" | "#f1c40f" => ColorChoice::Yellow,
            "orange" | "naranja" | "#e67e22" => ColorChoice::Orange,
            "red" | "rojo" | "#e74c3c" => ColorChoice::Red,
            "cyan" | "cian" | "#1abc9c" => ColorChoice::Cyan,
            "gray" | "grey" | "gris" | "#95a5a6" => ColorChoice::Gray,
            _ => ColorChoice::Default,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColorChoice::Default => "Default",
            ColorChoice::Green => "Green",
            ColorChoice::Blue => "Blue",
            ColorChoice::Purple => "Purple",
            ColorChoice::Yellow => "Yellow",
            ColorChoice::Orange => "Orange",
            ColorChoice::Red => "Red",
            ColorChoice::Cyan => "Cyan",
            ColorChoice::Gray => "Gray",
        }
    }

    /// Hex code for an explicit choice; `None` for `Default`.
    pub fn hex(&self) -> Option<&'static str> {
        match self {
            ColorChoice::Default => None,
            ColorChoice::Green => Some("#2ECC71"),
            ColorChoice::Blue => Some("#3498DB"),
            ColorChoice::Purple => Some("#9B59B6"),
            ColorChoice::Yellow => Some("#F1C40F"),
            ColorChoice::Orange => Some("#E67E22"),
            ColorChoice::Red => Some("#E74C3C"),
            ColorChoice::Cyan => Some("#1ABC9C"),
            ColorChoice::Gray => Some("#95A5A6"),
        }
    }
}

// ── Project color rotation ──────────────────────────────────────────────────

pub const PROJECT_COLORS: &[&str] = &[
    "#4285F4", // blue
    "#34A853", // green
    "#AB47BC", // purple
    "#FB8C00", // orange
    "#03A9F4", // light blue
    "#E53935", // red
    "#00BCD4", // cyan
    "#FFC107", // amber
];

/// Color for a project by its display rank.
pub fn project_color(rank: usize) -> &'static str {
    PROJECT_COLORS[rank % PROJECT_COLORS.len()]
}

/// Final bar color: the explicit choice, or the project's rotation color.
pub fn resolve_color(choice: ColorChoice, project_rank: usize) -> &'static str {
    choice.hex().unwrap_or_else(|| project_color(project_rank))
}
