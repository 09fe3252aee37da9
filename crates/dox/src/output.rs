//! Styled messages on stderr.

use std::fmt::Display;

use console::{Style, Term};

/// Writes human-facing progress and results to stderr, leaving stdout free.
pub(crate) struct Output {
    term: Term,
    heading: Style,
    good: Style,
    caution: Style,
    failure: Style,
    label: Style,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            heading: Style::new().cyan().bold(),
            good: Style::new().green(),
            caution: Style::new().yellow(),
            failure: Style::new().red().bold(),
            label: Style::new().dim(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        self.emit(msg);
    }

    pub(crate) fn heading(&self, msg: &str) {
        self.emit(self.heading.apply_to(msg));
    }

    pub(crate) fn success(&self, msg: &str) {
        self.emit(self.good.apply_to(msg));
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.emit(self.caution.apply_to(msg));
    }

    pub(crate) fn error(&self, msg: &str) {
        self.emit(self.failure.apply_to(msg));
    }

    /// Indented line with a dimmed leading label, e.g. a page id.
    pub(crate) fn row(&self, label: &str, msg: &str) {
        self.emit(format_args!("  {:>8}  {msg}", self.label.apply_to(label)));
    }

    // A closed stderr is not worth failing the command over.
    fn emit(&self, text: impl Display) {
        let _ = self.term.write_line(&text.to_string());
    }
}
