//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::fmt::Display;

use colored::Colorize;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print applied change (green checkmark)
pub fn success(msg: &(impl Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print `name: value` with a green name
pub fn labelled(name: &str, value: &(impl Display + ?Sized)) {
    println!("{}: {}", name.green(), value);
}

/// Print one category line; leaf categories get a dimmed marker
pub fn category(line: &str, childless: bool) {
    if childless {
        println!("{}  {}", line, "(no subcategories)".dimmed());
    } else {
        println!("{}", line);
    }
}

/// Print a placeholder for an absent value (dimmed)
pub fn none(msg: &str) {
    println!("{}", msg.dimmed());
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl Display + ?Sized)) {
    println!("{}", msg);
}
