//! Terminal confirmations.

use std::io::{self, BufRead, Write};

use schoolgrid_core::grid::{WeekClearOffer, WeekFillOffer};
use schoolgrid_core::week_fill::Prompter;

/// Asks on stderr and reads the answer from stdin. With `assume_yes` every
/// question is answered yes without reading input.
pub struct TerminalPrompter {
    assume_yes: bool,
}

impl TerminalPrompter {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    fn ask(&self, question: &str) -> bool {
        if self.assume_yes {
            tracing::debug!(question, "Auto-confirmed");
            return true;
        }
        let mut stderr = io::stderr();
        let _ = write!(stderr, "{question} [y/N] ");
        let _ = stderr.flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => is_yes(&line),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read answer, assuming no");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

impl Prompter for TerminalPrompter {
    fn confirm_week_fill(&self, offer: &WeekFillOffer) -> bool {
        self.ask(&format!(
            "Fill period {} with Monday's assignment for the whole week?",
            offer.period_id
        ))
    }

    fn confirm_week_clear(&self, offer: &WeekClearOffer) -> bool {
        self.ask(&format!(
            "Clear period {} for the whole week?",
            offer.period_id
        ))
    }

    fn confirm_duplicate(&self, message: &str) -> bool {
        self.ask(&format!("{message}\nSave anyway?"))
    }
}
