//! User-facing notifications.
//!
//! The panel never prints. Recoverable errors and confirmation questions go to
//! a [`NotificationSink`] supplied by the host: the terminal client prompts on
//! the console, tests use [`RecordingNotifier`].

use crate::error::ChaospadError;

pub trait NotificationSink {
    /// Show a recoverable error to the user.
    fn notify_error(&mut self, error: &ChaospadError);

    /// Ask a yes/no question. Blocks the action until answered.
    fn confirm(&mut self, message: &str) -> bool;
}

impl<N: NotificationSink + ?Sized> NotificationSink for Box<N> {
    fn notify_error(&mut self, error: &ChaospadError) {
        (**self).notify_error(error)
    }

    fn confirm(&mut self, message: &str) -> bool {
        (**self).confirm(message)
    }
}

/// Remembers everything it was asked and answers confirmations with a fixed
/// reply.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    pub errors: Vec<String>,
    pub questions: Vec<String>,
    answer: bool,
}

impl RecordingNotifier {
    pub fn accepting() -> Self {
        Self {
            answer: true,
            ..Self::default()
        }
    }

    pub fn declining() -> Self {
        Self::default()
    }

    pub fn set_answer(&mut self, answer: bool) {
        self.answer = answer;
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify_error(&mut self, error: &ChaospadError) {
        self.errors.push(error.user_message());
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.questions.push(message.to_string());
        self.answer
    }
}
