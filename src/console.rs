//! Console formatting for command output
//!
//! Timestamped, icon-prefixed, color-coded lines. Formatting functions
//! return strings so they can be tested; the `print_*` helpers write them
//! to stdout.

use colored::Colorize;

use crate::error::FailureKind;

/// Severity of a narration step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Neutral progress
    Info,
    /// Something worked
    Success,
    /// Something failed
    Error,
    /// Something noteworthy, e.g. a protection kicking in
    Warning,
}

impl Status {
    /// Icon shown in front of the message
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Info => "ℹ️",
            Self::Success => "✅",
            Self::Error => "❌",
            Self::Warning => "⚠️",
        }
    }

    fn paint(&self, message: &str) -> String {
        match self {
            Self::Info => message.normal().to_string(),
            Self::Success => message.green().to_string(),
            Self::Error => message.red().to_string(),
            Self::Warning => message.yellow().to_string(),
        }
    }
}

/// Verdict of a test-suite line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStatus {
    /// Neutral step
    Info,
    /// Expectation met
    Pass,
    /// Expectation not met
    Fail,
    /// Inconclusive
    Warn,
}

impl TestStatus {
    /// Icon shown in front of the test name
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Info => "🧪",
            Self::Pass => "✅",
            Self::Fail => "❌",
            Self::Warn => "⚠️",
        }
    }

    fn paint(&self, message: &str) -> String {
        match self {
            Self::Info => message.normal().to_string(),
            Self::Pass => message.green().to_string(),
            Self::Fail => message.red().to_string(),
            Self::Warn => message.yellow().to_string(),
        }
    }
}

/// Current local time as `HH:MM:SS`
pub fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Formats a narration line
///
/// # Examples
///
/// ```
/// use authgate::console::{format_step, Status};
///
/// let line = format_step("Login successful", Status::Success, "12:00:00");
/// assert!(line.contains("12:00:00"));
/// assert!(line.contains("✅"));
/// assert!(line.contains("Login successful"));
/// ```
pub fn format_step(message: &str, status: Status, timestamp: &str) -> String {
    format!(
        "[{}] {} {}",
        timestamp.dimmed(),
        status.icon(),
        status.paint(message)
    )
}

/// Prints a narration line
pub fn print_step(message: &str, status: Status) {
    println!("{}", format_step(message, status, &timestamp()));
}

/// Formats a test-suite line, with an optional indented detail line
pub fn format_test(
    name: &str,
    status: TestStatus,
    details: Option<&str>,
    timestamp: &str,
) -> String {
    let mut line = format!(
        "[{}] {} {}",
        timestamp.dimmed(),
        status.icon(),
        status.paint(name)
    );
    if let Some(details) = details.filter(|d| !d.is_empty()) {
        line.push_str(&format!("\n    → {}", details));
    }
    line
}

/// Prints a test-suite line
pub fn print_test(name: &str, status: TestStatus, details: Option<&str>) {
    println!("{}", format_test(name, status, details, &timestamp()));
}

/// Prints a section header framed by rules of `width` `=` characters
pub fn print_banner(title: &str, width: usize) {
    let rule = "=".repeat(width);
    println!("\n{}", rule);
    println!("{}", title.bold());
    println!("{}", rule);
}

/// Prints a heading underlined with `-`
pub fn print_heading(title: &str) {
    println!("{}", title.bold());
    println!("{}", "-".repeat(title.chars().count().max(30)));
}

/// What a user should do about a failure
pub fn advice(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::RateLimited | FailureKind::ServiceUnavailable => "try again later",
        FailureKind::BadCredentials => "check your username and password",
        FailureKind::InsufficientRole => "log in with a role that grants this operation",
        FailureKind::InvalidToken | FailureKind::Unauthorized => "log in again",
    }
}
