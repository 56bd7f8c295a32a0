use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Value stored in the config file.
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }
}

/// Colors for one theme. The UI reads everything through this so the two
/// palettes stay in sync.
pub struct Palette {
    pub header_bg: Color,
    pub header_fg: Color,
    pub user_label: Color,
    pub user_text: Color,
    pub assistant_label: Color,
    pub assistant_text: Color,
    pub timestamp: Color,
    pub border: Color,
    pub border_focused: Color,
    pub input_text: Color,
    pub muted: Color,
    pub footer_bg: Color,
}

pub fn palette(mode: ThemeMode) -> Palette {
    match mode {
        ThemeMode::Dark => Palette {
            header_bg: Color::DarkGray,
            header_fg: Color::Magenta,
            user_label: Color::Cyan,
            user_text: Color::White,
            assistant_label: Color::Magenta,
            assistant_text: Color::Gray,
            timestamp: Color::DarkGray,
            border: Color::DarkGray,
            border_focused: Color::Magenta,
            input_text: Color::Cyan,
            muted: Color::DarkGray,
            footer_bg: Color::Black,
        },
        ThemeMode::Light => Palette {
            header_bg: Color::Magenta,
            header_fg: Color::White,
            user_label: Color::Blue,
            user_text: Color::Black,
            assistant_label: Color::Magenta,
            assistant_text: Color::Black,
            timestamp: Color::Gray,
            border: Color::Gray,
            border_focused: Color::Magenta,
            input_text: Color::Blue,
            muted: Color::Gray,
            footer_bg: Color::White,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_between_modes() {
        assert_eq!(ThemeMode::Light.toggled(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
    }

    #[test]
    fn config_value_round_trips() {
        for mode in [ThemeMode::Light, ThemeMode::Dark] {
            assert_eq!(ThemeMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(ThemeMode::from_str("octane"), None);
    }
}
