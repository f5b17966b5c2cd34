//! Terminal styling for CLI output.
//!
//! Styles are only applied when stdout is a terminal, so piped output stays plain.

use std::io::{self, IsTerminal};

/// ANSI color codes.
mod colors {
    /// Bold text.
    pub const BOLD: &str = "\x1b[1m";
    /// Cyan text (for headers).
    pub const CYAN: &str = "\x1b[36m";
    /// Yellow text (for warnings).
    pub const YELLOW: &str = "\x1b[33m";
    /// Dim/gray text (for less important info).
    pub const DIM: &str = "\x1b[2m";
    /// Reset all formatting.
    pub const RESET: &str = "\x1b[0m";
}

/// Wraps text in the given styles when stdout is a terminal.
fn paint(styles: &[&str], text: &str) -> String {
    if io::stdout().is_terminal() {
        format!("{}{text}{}", styles.concat(), colors::RESET)
    } else {
        text.to_string()
    }
}

/// Formats a header with bold cyan styling.
pub fn header(text: &str) -> String {
    paint(&[colors::BOLD, colors::CYAN], text)
}

/// Formats text as a subheader (bold).
pub fn subheader(text: &str) -> String {
    paint(&[colors::BOLD], text)
}

/// Formats text as dimmed/less important.
pub fn dim(text: &str) -> String {
    paint(&[colors::DIM], text)
}

/// Formats text as a warning (yellow).
pub fn warning(text: &str) -> String {
    paint(&[colors::YELLOW], text)
}

/// Indents every line of a block.
pub fn indent(block: &str, prefix: &str) -> String {
    block
        .lines()
        .map(|line| format!("{prefix}{line}\n"))
        .collect()
}
