#![doc = include_str!("../../../README.md")]

mod ast;
mod builtins;
mod diagnostics;
mod evaluator;
mod io;
mod object;
mod resource;
mod runner;
mod scope;
mod sema;
mod syntax;
mod token;
mod types;

pub use crate::{
    diagnostics::{Diagnostic, DiagnosticSink, RuntimeError, Severity},
    evaluator::Evaluator,
    io::{CollectStringPrint, NoPrint, PrintWriter, StdPrint},
    object::Object,
    resource::{RecursionError, RecursionGuard, DEFAULT_MAX_DEPTH},
    runner::Runner,
    syntax::{LexError, ParseError},
    token::{CodeLoc, CodeRange},
};
