use mimizuku_core::Term;
use mimizuku_rules::Diagnostic;
use tracing::warn;

/// Per-compilation state: fresh variable numbering and collected diagnostics.
///
/// Each [`crate::DlpCompiler::compile`] call owns one, so separate runs
/// never share counters.
#[derive(Debug, Default)]
pub struct CompilationContext {
    next_variable: usize,
    diagnostics: Vec<Diagnostic>,
}

impl CompilationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A variable not used anywhere else in this compilation
    pub fn fresh_variable(&mut self) -> Term {
        self.next_variable += 1;
        Term::var(format!("v{}", self.next_variable))
    }

    pub fn diagnose<S: Into<String>, M: Into<String>>(&mut self, source: S, message: M) {
        let diagnostic = Diagnostic::new(source, message);
        warn!(source = %diagnostic.source, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
