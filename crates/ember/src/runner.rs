//! Public entry point: parse, check, and run a complete Ember program.
//!
//! Grounded in `ouros::run::Runner`'s split between a one-time
//! parse-and-prepare step and repeated execution, trimmed to the shape
//! Ember actually needs: there is no snapshotting or external-function
//! pausing to support (a VM/session layer is out of scope),
//! so `run` always executes the whole program to completion in one call.

use crate::{
    ast::Ast,
    diagnostics::{Diagnostic, DiagnosticSink, RuntimeError},
    evaluator::Evaluator,
    io::{CollectStringPrint, PrintWriter},
    object::Object,
    resource::RecursionGuard,
    scope::ScopeTree,
    sema::{self, Resolutions},
    syntax,
};

/// A parsed and semantically checked Ember program, ready to run.
pub struct Runner {
    ast: Ast,
    resolutions: Resolutions,
}

impl Runner {
    /// Parses and checks `source`. On failure, returns every diagnostic
    /// collected (a single parse error, or the full set of Sema errors).
    pub fn new(source: &str) -> Result<Self, Vec<Diagnostic>> {
        let mut ast = syntax::parse(source).map_err(|err| vec![Diagnostic::error(err.range, err.message)])?;
        let mut scopes = ScopeTree::new();
        let mut sink = DiagnosticSink::new();
        let resolutions = sema::check_program(&mut ast, &mut scopes, &mut sink);
        if sink.had_errors() {
            return Err(sink.diagnostics().to_vec());
        }
        Ok(Self { ast, resolutions })
    }

    /// Executes the program, writing any `print` output to `writer`.
    ///
    /// # Errors
    /// Returns the `RuntimeError` that aborted execution (division/modulo by
    /// zero, or the recursion limit). A `throw` that escapes every `catch`
    /// is not an error here; it is the program's result (see `Evaluator::run`).
    pub fn run(&self, writer: &mut impl PrintWriter) -> Result<Object, RuntimeError> {
        let mut evaluator = Evaluator::new(&self.ast, &self.resolutions, writer, RecursionGuard::default());
        evaluator.run(&self.ast.top_level)
    }

    /// Runs the program and collects everything it printed into an owned
    /// `String`, for tests that want to assert on `print` output without
    /// touching stdout.
    pub fn run_collecting_output(&self) -> Result<(Object, String), RuntimeError> {
        let mut writer = CollectStringPrint::new();
        let value = self.run(&mut writer)?;
        Ok((value, writer.into_output()))
    }
}
