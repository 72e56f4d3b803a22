//! Terminal implementation of the core `Console` contract.

use dialoguer::Confirm;
use log::warn;
use snapkit_core::Console;

/// Writes messages to stdout, progress to stderr and asks through dialoguer.
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn message(&mut self, text: &str) {
        println!("{text}");
    }

    fn progress(&mut self, text: &str, _permanent: bool) {
        eprintln!("{text}");
    }

    fn confirm(&mut self, question: &str) -> bool {
        match Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
        {
            Ok(answer) => answer,
            Err(err) => {
                warn!("event=confirm module=cli status=error error={err}");
                false
            }
        }
    }
}
