//! Terminal styling for request log output.
//!
//! # Responsibilities
//! - Name the palette tints and modifiers available to the log output
//! - Parse style strings from configuration ("cyan", "bold grey")
//! - Paint text with ANSI markers via the `colored` crate
//!
//! # Design Decisions
//! - Styles are resolved once at configuration time and injected through
//!   `Settings`; the core never reaches for a global palette
//! - Unknown style names are a validation error, not a runtime fallback

use std::str::FromStr;

use colored::Colorize;
use thiserror::Error;

/// Base colour of a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tint {
    /// No colouring; the terminal's default foreground.
    #[default]
    Default,
    Black,
    Cyan,
    /// Rendered as bright black.
    Grey,
    Red,
    Green,
    Yellow,
    White,
}

impl FromStr for Tint {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Tint::Default),
            "black" => Ok(Tint::Black),
            "cyan" => Ok(Tint::Cyan),
            "grey" | "gray" => Ok(Tint::Grey),
            "red" => Ok(Tint::Red),
            "green" => Ok(Tint::Green),
            "yellow" => Ok(Tint::Yellow),
            "white" => Ok(Tint::White),
            other => Err(ParseStyleError::UnknownToken(other.to_string())),
        }
    }
}

/// An opaque "style a string" capability: one tint plus optional modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub tint: Tint,
    pub bold: bool,
    pub underline: bool,
}

impl Style {
    /// Build a style with explicit modifiers.
    pub const fn new(tint: Tint, bold: bool, underline: bool) -> Self {
        Self {
            tint,
            bold,
            underline,
        }
    }

    /// Plain style with the given tint.
    pub const fn tinted(tint: Tint) -> Self {
        Self::new(tint, false, false)
    }

    /// Paint `text` with this style's ANSI markers.
    ///
    /// Honours the `colored` crate's global colour override, so output is
    /// plain text when colours are disabled (pipes, tests).
    pub fn paint(&self, text: &str) -> String {
        let mut painted = match self.tint {
            Tint::Default => text.normal(),
            Tint::Black => text.black(),
            Tint::Cyan => text.cyan(),
            Tint::Grey => text.bright_black(),
            Tint::Red => text.red(),
            Tint::Green => text.green(),
            Tint::Yellow => text.yellow(),
            Tint::White => text.white(),
        };
        if self.bold {
            painted = painted.bold();
        }
        if self.underline {
            painted = painted.underline();
        }
        painted.to_string()
    }
}

impl FromStr for Style {
    type Err = ParseStyleError;

    /// Parse a whitespace-separated style string: zero or more modifiers
    /// ("bold", "underline") and at most one tint name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut style = Style::default();
        let mut saw_tint = false;

        for token in s.split_whitespace() {
            match token {
                "bold" => style.bold = true,
                "underline" => style.underline = true,
                other => {
                    if saw_tint {
                        return Err(ParseStyleError::MultipleTints(s.to_string()));
                    }
                    style.tint = other.parse()?;
                    saw_tint = true;
                }
            }
        }

        if s.split_whitespace().next().is_none() {
            return Err(ParseStyleError::Empty);
        }
        Ok(style)
    }
}

/// Error parsing a style string from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseStyleError {
    #[error("unrecognized style token '{0}'")]
    UnknownToken(String),

    #[error("style '{0}' names more than one colour")]
    MultipleTints(String),

    #[error("empty style string")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_tint() {
        let style: Style = "cyan".parse().unwrap();
        assert_eq!(style, Style::tinted(Tint::Cyan));
    }

    #[test]
    fn test_parse_with_modifiers() {
        let style: Style = "bold grey".parse().unwrap();
        assert_eq!(style, Style::new(Tint::Grey, true, false));

        let style: Style = "underline red".parse().unwrap();
        assert_eq!(style, Style::new(Tint::Red, false, true));
    }

    #[test]
    fn test_parse_rejects_unknown_tokens() {
        assert_eq!(
            "blurple".parse::<Style>(),
            Err(ParseStyleError::UnknownToken("blurple".to_string()))
        );
        assert_eq!(
            "red green".parse::<Style>(),
            Err(ParseStyleError::MultipleTints("red green".to_string()))
        );
        assert_eq!("".parse::<Style>(), Err(ParseStyleError::Empty));
    }

    #[test]
    fn test_paint_without_colours_is_identity() {
        colored::control::set_override(false);
        let style = Style::new(Tint::Red, true, true);
        assert_eq!(style.paint("ERROR FLUSH"), "ERROR FLUSH");
    }
}
