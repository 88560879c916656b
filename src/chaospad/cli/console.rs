use chaospad::error::ChaospadError;
use chaospad::notify::NotificationSink;
use colored::Colorize;
use console::Term;

/// Notification sink for the terminal: errors go to stderr, confirmations are
/// asked on the controlling terminal.
pub struct ConsoleNotifier {
    term: Term,
    assume_yes: bool,
    errors: usize,
}

impl ConsoleNotifier {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            term: Term::stderr(),
            assume_yes,
            errors: 0,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

impl NotificationSink for ConsoleNotifier {
    fn notify_error(&mut self, error: &ChaospadError) {
        self.errors += 1;
        eprintln!("{} {}", "Error:".red().bold(), error.user_message());
    }

    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        if !self.term.is_term() {
            eprintln!("{} {}", message, "(not a terminal; pass --yes)".dimmed());
            return false;
        }
        if self.term.write_str(&format!("{} [y/N] ", message)).is_err() {
            return false;
        }
        match self.term.read_line() {
            Ok(answer) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
