use colored::*;
use tandem::SignalingState;
use tandem::client::StatusSink;

/// Prints status changes to the terminal.
pub struct ConsoleStatus {
    label: String,
}

impl ConsoleStatus {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    fn line(&self, text: ColoredString) {
        println!("{} {}", format!("[{}]", self.label).dimmed(), text);
    }
}

impl StatusSink for ConsoleStatus {
    fn report(&self, state: SignalingState) {
        let text = match state {
            SignalingState::Established => state.label().green(),
            SignalingState::Full => state.label().red(),
            SignalingState::Disconnected => state.label().yellow(),
            _ => state.label().cyan(),
        };
        self.line(if state.is_terminal() { text.bold() } else { text });
    }

    fn retrying(&self, attempt: u32, max: u32) {
        self.line(format!("Retrying ({}/{})...", attempt, max).yellow());
    }

    fn failed(&self, reason: &str) {
        self.line(format!("Failed: {}", reason).red());
    }

    fn clear(&self) {
        self.line("Restarting call".dimmed());
    }
}
