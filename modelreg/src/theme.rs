use clap::builder::styling::{AnsiColor, Color as ClapColor, Style};
use colored::{Color, ColoredString, Colorize, control::ShouldColorize};
use once_cell::sync::Lazy;

/// Whether the environment (`NO_COLOR`, `CLICOLOR`, tty) allows colored output.
pub static COLOR_SUPPORTED: Lazy<bool> = Lazy::new(|| ShouldColorize::from_env().should_colorize());

/// Marker for a type path that a fresh render would add.
pub const ADDED: &str = "+";
/// Marker for a type path that a fresh render would drop.
pub const REMOVED: &str = "-";
pub const ARROW: &str = "→";

/// Role a piece of CLI text plays. Each role maps to one terminal color
/// and, for status messages, one leading icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Success,
    Failure,
    Warning,
    Note,
    Heading,
    Title,
    Label,
    Value,
    Accent,
    Subtle,
}

impl Tone {
    pub const fn color(self) -> Color {
        match self {
            Tone::Success => Color::Green,
            Tone::Failure => Color::Red,
            Tone::Warning => Color::Yellow,
            Tone::Note => Color::Blue,
            Tone::Heading => Color::Cyan,
            Tone::Title => Color::BrightBlue,
            Tone::Label => Color::BrightCyan,
            Tone::Value => Color::White,
            Tone::Accent => Color::Magenta,
            Tone::Subtle => Color::BrightBlack,
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Tone::Success => "✓",
            Tone::Failure => "✗",
            Tone::Warning => "⚠",
            Tone::Note => "ℹ",
            _ => ARROW,
        }
    }

    /// Same color as a clap help style.
    pub fn help_style(self) -> Style {
        let ansi = match self {
            Tone::Success => AnsiColor::Green,
            Tone::Failure => AnsiColor::Red,
            Tone::Warning => AnsiColor::Yellow,
            Tone::Note => AnsiColor::Blue,
            Tone::Heading => AnsiColor::Cyan,
            Tone::Title => AnsiColor::BrightBlue,
            Tone::Label => AnsiColor::BrightCyan,
            Tone::Value => AnsiColor::White,
            Tone::Accent => AnsiColor::Magenta,
            Tone::Subtle => AnsiColor::BrightBlack,
        };
        Style::new().fg_color(Some(ClapColor::Ansi(ansi)))
    }

    pub fn apply(self, text: &str) -> ColoredString {
        text.color(self.color())
    }
}

/// Render `text` in `tone`, or as plain text when color is off.
pub fn paint(text: &str, tone: Tone, bold: bool, use_color: bool) -> String {
    match (use_color, bold) {
        (false, _) => text.to_string(),
        (true, true) => tone.apply(text).bold().to_string(),
        (true, false) => tone.apply(text).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_without_color_is_plain() {
        assert_eq!(paint("models", Tone::Heading, true, false), "models");
    }

    #[test]
    fn test_status_tones_have_distinct_icons() {
        let icons = [Tone::Success, Tone::Failure, Tone::Warning, Tone::Note].map(Tone::icon);
        for (index, icon) in icons.iter().enumerate() {
            assert!(!icons[index + 1..].contains(icon));
        }
        assert_eq!(Tone::Subtle.icon(), ARROW);
    }
}
