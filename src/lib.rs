//! An interpreter for a minimal string-rewriting language.
//!
//! A program is an ordered list of rules, one per line, of the form
//! `[(modifier)]left=[(modifier)]right`. Each step applies the first rule
//! whose left side occurs in the tape: the leftmost occurrence is deleted and
//! the right side is inserted where it was found.
//!
//! | Modifier   | Side  | Effect                                        |
//! |------------|-------|-----------------------------------------------|
//! | `(once)`   | left  | Rule fires at most once per run               |
//! | `(start)`  | left  | Left side must be at the start of the tape    |
//! | `(end)`    | left  | Left side must be at the end of the tape      |
//! | `(start)`  | right | Insert at the start of the tape               |
//! | `(end)`    | right | Insert at the end of the tape                 |
//! | `(return)` | right | Replace the whole tape with the right side and stop |
//!
//! # Example
//!
//! ```rust
//! use abrewrite::{Program, RunConfig, RecordingSink, Termination, run, run_with_sink};
//!
//! let program = Program::compile("# sort a and b\nba=ab\n").unwrap();
//! assert_eq!(run(&program, "babba", 1000), "aabbb");
//!
//! let program = Program::compile("(once)a=b\na=c\n").unwrap();
//! let mut sink = RecordingSink::new();
//! let outcome = run_with_sink(&program, "aa", &RunConfig::default(), &mut sink);
//!
//! assert_eq!(sink.tapes(), vec!["ba", "bc"]);
//! assert_eq!(outcome.termination, Termination::Exhausted);
//! ```

pub mod code;
pub mod compiler;
mod config;
mod interpreter;
mod program;
mod sink;

pub use code::{LeftModifier, Pattern, Replacement, RightModifier, Rule, Side};
pub use compiler::{ParseError, ParseErrorKind, compile_rule};
pub use config::{DEFAULT_MAX_STEPS, RunConfig};
pub use interpreter::{Execution, RunOutcome, Step, Termination, run, run_with_sink};
pub use program::{Program, RuleId, resolve_program_path, rule_lines};
pub use sink::{ConsoleSink, NullSink, RecordedStep, RecordingSink, StepReport, StepSink};
