//! Output formatting utilities

use console::style;
use next_task_core::TaskRecord;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Create a styled header
pub fn header(text: &str) -> String {
    style(text).bold().to_string()
}

/// Create a styled key-value line
pub fn key_value(key: &str, value: &str) -> String {
    format!("  {}: {}", style(key).dim(), value)
}

/// Render a delivered task as a list item followed by a blank line
///
/// ```text
/// - Jira: Rotate keys
///   before friday
///
/// ```
pub fn render_task(task: &TaskRecord) -> String {
    if task.has_description() {
        format!("- {}: {}\n  {}\n\n", task.kind, task.title, task.description)
    } else {
        format!("- {}: {}\n\n", task.kind, task.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_description() {
        let task = TaskRecord::new("GoogleMail", "m1", "Process: Invoice", "Please pay");
        assert_eq!(
            render_task(&task),
            "- GoogleMail: Process: Invoice\n  Please pay\n\n"
        );
    }

    #[test]
    fn test_render_without_description() {
        let task = TaskRecord::new("GoogleTask", "t1", "Buy milk", "");
        assert_eq!(render_task(&task), "- GoogleTask: Buy milk\n\n");
    }
}
