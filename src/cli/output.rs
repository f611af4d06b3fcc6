//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

/// Turn colors off when the settings ask for it. Never forces them on.
pub fn configure(color: bool) {
    if !color {
        colored::control::set_override(false);
    }
}

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print failure status (red X, indented)
pub fn failure(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "✗".red(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print key/value pair (dimmed key)
pub fn field(key: &str, value: &(impl std::fmt::Display + ?Sized)) {
    println!("  {:<14} {}", format!("{}:", key).dimmed(), value);
}

/// Print plain output (no color, for data and JSON)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Print result count status line (stderr, keeps stdout clean for data)
pub fn status(count: usize) {
    let noun = if count == 1 { "result" } else { "results" };
    eprintln!("{} {} {}", "→".cyan(), count, noun);
}
