//! Newline style parsing and resolution.

use dump_core::DumpError;
use std::fmt;
use std::str::FromStr;

/// Line ending written after every generated statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewlineStyle {
    /// `\n`
    Lf,
    /// `\r\n`
    Crlf,
    /// Pick from the connection's encoding name
    #[default]
    Auto,
}

impl NewlineStyle {
    /// Resolve to the actual line ending.
    /// `Auto` selects CRLF for encodings whose name starts with `WIN` or `DOS`
    /// (e.g. `WIN1252`), LF for everything else.
    pub fn resolve(self, encoding_name: &str) -> &'static str {
        match self {
            NewlineStyle::Lf => "\n",
            NewlineStyle::Crlf => "\r\n",
            NewlineStyle::Auto => {
                let upper = encoding_name.trim().to_ascii_uppercase();
                if upper.starts_with("WIN") || upper.starts_with("DOS") {
                    "\r\n"
                } else {
                    "\n"
                }
            }
        }
    }
}

/// Parse a newline style such as "LF", "crlf" or "auto" (case-insensitive)
impl FromStr for NewlineStyle {
    type Err = DumpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lf" => Ok(NewlineStyle::Lf),
            "crlf" => Ok(NewlineStyle::Crlf),
            "auto" => Ok(NewlineStyle::Auto),
            _ => Err(DumpError::InvalidNewlineStyle(s.to_string())),
        }
    }
}

impl fmt::Display for NewlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewlineStyle::Lf => write!(f, "LF"),
            NewlineStyle::Crlf => write!(f, "CRLF"),
            NewlineStyle::Auto => write!(f, "auto"),
        }
    }
}
