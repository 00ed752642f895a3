//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts and user input handling

use std::io::{self, BufRead, Write};

use anyhow::Result;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_commits, display_current_version, display_discovered, display_error,
    display_failures, display_planned_changes, display_status, display_success,
    display_update_report, display_warning,
};

/// Prompts user to confirm an action with a yes/no prompt.
///
/// Displays the given prompt and accepts "y" or "yes" (case-insensitive) as confirmation.
/// Default is "no" if user presses Enter.
///
/// # Returns
/// * `Ok(true)` - If user entered "y" or "yes"
/// * `Ok(false)` - Otherwise (including Enter, or "n"/"no")
pub fn confirm_action(prompt: &str) -> Result<bool> {
    print!("\n{} (y/N): ", prompt);
    io::stdout().flush()?;
    read_confirmation(io::stdin().lock())
}

fn read_confirmation<R: BufRead>(mut input: R) -> Result<bool> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let response = line.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_confirmation() {
        assert!(read_confirmation("y\n".as_bytes()).unwrap());
        assert!(read_confirmation("YES\n".as_bytes()).unwrap());
        assert!(!read_confirmation("\n".as_bytes()).unwrap());
        assert!(!read_confirmation("no\n".as_bytes()).unwrap());
        assert!(!read_confirmation("".as_bytes()).unwrap());
    }
}
