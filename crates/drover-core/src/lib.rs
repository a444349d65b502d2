//! # drover-core
//!
//! Core library for the drover automation scripting language: a small
//! command-oriented DSL that applications embed to let users script them.
//! Source text flows through [`lexer::tokenize`] into [`parser::Parser`],
//! which builds the statement trees in [`ast`]; [`interp::Interpreter`]
//! walks those trees against an application implementing
//! [`host::CommandHost`].
//!
//! Two properties shape the whole pipeline:
//!
//! - **Totality.** The lexer never fails and the parser recovers from any
//!   input by skipping tokens, so arbitrary text always produces a run
//!   (possibly an empty one) plus diagnostics, never a syntax abort.
//! - **Budgeting.** Parsing and execution share one [`budget`] that
//!   charges every recursive entry point and every evaluated operation,
//!   bounding what a script can cost its host.
//!
//! ## Modules
//!
//! - [`lexer`] - total tokenizer
//! - [`parser`] - recursive descent parser with skip-one-token recovery
//! - [`ast`] - statement and expression trees plus their JSON shape
//! - [`budget`] - cost accounting shared by parser and interpreter
//! - [`value`], [`ops`] - runtime values and operator semantics
//! - [`state`] - variables and the operand stack
//! - [`builtins`] - built-in function library
//! - [`host`] - command boundary to the embedding application
//! - [`interp`] - tree-walking evaluator
//! - [`error`] - error taxonomy
//!
//! ## Example
//!
//! ```
//! use drover_core::host::NullHost;
//! use drover_core::interp::Interpreter;
//!
//! let mut interp = Interpreter::new(NullHost::new());
//! let value = interp.run_source("x = 2 + 3\ny = x * 4").expect("script runs");
//! assert_eq!(value.to_string(), "20");
//! ```

pub mod ast;
pub mod budget;
pub mod builtins;
pub mod error;
pub mod host;
pub mod interp;
pub mod lexer;
pub mod ops;
pub mod parser;
pub mod state;
pub mod value;
