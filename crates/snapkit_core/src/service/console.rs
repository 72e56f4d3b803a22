//! User-facing output and confirmation contract.

/// Terminal surface used by interactive services.
///
/// Diagnostics go to `log`; a console only carries text meant for the user.
pub trait Console {
    /// Prints a final, user-visible message.
    fn message(&mut self, text: &str);

    /// Reports progress; `permanent` notices stay visible after the step.
    fn progress(&mut self, text: &str, permanent: bool);

    /// Asks a yes/no question. Non-interactive consoles answer `false`.
    fn confirm(&mut self, question: &str) -> bool;

    /// Runs `f` while the console has surrendered the terminal.
    fn pause<R>(&mut self, f: impl FnOnce() -> R) -> R {
        f()
    }
}
