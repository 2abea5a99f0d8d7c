//! Collects the warnings raised during a conversion.
//!
//! A `Diagnostics` sink is handed to the conversion entry points so that callers decide how
//! warnings are shown.  Every entry is also forwarded to the `log` facade.

use std::fmt::Display;

use crate::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub error: Error,
    /// The graph object being converted when the problem was found (e.g. "node a").
    pub context: Option<String>,
}

impl Display for Diagnostic {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.context {
            Some(context) => write!(fmt, "{} ({context}): {}", self.error.kind(), self.error),
            None => write!(fmt, "{}: {}", self.error.kind(), self.error),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    /// Object currently being converted, attached to every new entry.
    context: Option<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a recovered problem.
    pub fn warn(&mut self, error: Error) {
        let diagnostic = Diagnostic {
            error,
            context: self.context.clone(),
        };

        log::warn!("{diagnostic}");
        self.entries.push(diagnostic);
    }

    /// Set the object that subsequent entries refer to.
    pub fn set_context(&mut self, context: Option<String>) {
        self.context = context;
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of warnings whose error has the given kind name.
    pub fn count_kind(&self, kind: &str) -> usize {
        self.warnings().filter(|entry| entry.error.kind() == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_attached() {
        let mut diagnostics = Diagnostics::new();

        diagnostics.set_context(Some("node a".to_string()));
        diagnostics.warn(Error::UnresolvedColor {
            token: "blurple".to_string(),
            substitute: "black".to_string(),
        });
        diagnostics.set_context(None);
        diagnostics.warn(Error::malformed(3, "eof"));

        assert_eq!(diagnostics.entries().len(), 2);
        assert_eq!(diagnostics.warnings().count(), 2);
        assert_eq!(diagnostics.count_kind("UnresolvedColor"), 1);
        assert_eq!(
            diagnostics.entries()[0].to_string(),
            "UnresolvedColor (node a): unresolved color 'blurple', using black"
        );
        assert_eq!(diagnostics.entries()[1].context, None);
    }
}
