//! Reporting of tape state while a program runs.
//!
//! Provides a `StepSink` trait and three implementations:
//! - `ConsoleSink` writes the classic line-by-line report to any writer
//! - `RecordingSink` keeps every reported tape for later inspection
//! - `NullSink` discards everything

use std::io::{self, Write};

use crossterm::style::Stylize;

use crate::code::Rule;
use crate::interpreter::RunOutcome;

/// What the engine reports after applying one rule.
#[derive(Debug, Clone, Copy)]
pub struct StepReport<'a> {
    /// 1-based number of the step just applied.
    pub step: usize,
    /// Tape after the step.
    pub tape: &'a str,
    /// The rule that fired. Only present in verbose runs.
    pub rule: Option<&'a Rule>,
}

/// Receiver of tape updates from a running program.
pub trait StepSink {
    /// Called once with the initial tape, before any rule is tried.
    fn start(&mut self, tape: &str);

    /// Called after every applied step.
    fn step(&mut self, report: &StepReport<'_>);

    /// Called once when the run has ended, however it ended.
    fn finish(&mut self, outcome: &RunOutcome);
}

/// Sink that ignores all reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl StepSink for NullSink {
    fn start(&mut self, _tape: &str) {}
    fn step(&mut self, _report: &StepReport<'_>) {}
    fn finish(&mut self, _outcome: &RunOutcome) {}
}

/// One recorded step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedStep {
    pub step: usize,
    pub tape: String,
    /// Source line of the rule that fired, when the run was verbose.
    pub line: Option<usize>,
}

/// Sink that remembers everything it was told.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub initial: Option<String>,
    pub steps: Vec<RecordedStep>,
    pub outcome: Option<RunOutcome>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tapes after each step, in order.
    pub fn tapes(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.tape.as_str()).collect()
    }
}

impl StepSink for RecordingSink {
    fn start(&mut self, tape: &str) {
        self.initial = Some(tape.to_string());
    }

    fn step(&mut self, report: &StepReport<'_>) {
        self.steps.push(RecordedStep {
            step: report.step,
            tape: report.tape.to_string(),
            line: report.rule.map(|r| r.source_line),
        });
    }

    fn finish(&mut self, outcome: &RunOutcome) {
        self.outcome = Some(outcome.clone());
    }
}

const SEPARATOR: &str = "--------------------";

/// Writes the run report as plain lines, optionally with coloured labels.
///
/// Write failures do not interrupt the run. The first one is kept and can be
/// collected with [`ConsoleSink::into_result`]; nothing more is written after it.
pub struct ConsoleSink<W: Write> {
    out: W,
    color: bool,
    error: Option<io::Error>,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            error: None,
        }
    }

    /// Return the writer, or the first write error seen.
    pub fn into_result(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn label(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn line(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = writeln!(self.out, "{text}") {
            self.error = Some(err);
        }
    }
}

impl<W: Write> StepSink for ConsoleSink<W> {
    fn start(&mut self, tape: &str) {
        let text = format!("{} {tape}", self.label("start string:"));
        self.line(&text);
    }

    fn step(&mut self, report: &StepReport<'_>) {
        match report.rule {
            Some(rule) => {
                let lines = [
                    format!("{} {}", self.label("line:"), rule.source_line),
                    format!("{} {}", self.label("command:"), rule.raw_text),
                    format!("{} {}", self.label("currentString:"), report.tape),
                    SEPARATOR.to_string(),
                ];
                for text in &lines {
                    self.line(text);
                }
            }
            None => self.line(report.tape),
        }
    }

    fn finish(&mut self, outcome: &RunOutcome) {
        let text = if self.color {
            format!("{}{}", "output:".bold(), outcome.tape.as_str().green())
        } else {
            format!("output:{}", outcome.tape)
        };
        self.line(&text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_rule;
    use crate::interpreter::Termination;

    fn outcome(tape: &str) -> RunOutcome {
        RunOutcome {
            tape: tape.to_string(),
            termination: Termination::Exhausted,
            steps: 1,
        }
    }

    fn console_text(sink: ConsoleSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_result().unwrap()).unwrap()
    }

    #[test]
    fn test_console_quiet_report() {
        let mut sink = ConsoleSink::new(Vec::new(), false);
        sink.start("a");
        sink.step(&StepReport {
            step: 1,
            tape: "b",
            rule: None,
        });
        sink.finish(&outcome("b"));
        assert_eq!(console_text(sink), "start string: a\nb\noutput:b\n");
    }

    #[test]
    fn test_console_verbose_report() {
        let rule = compile_rule("a = b", 3).unwrap();
        let mut sink = ConsoleSink::new(Vec::new(), false);
        sink.step(&StepReport {
            step: 1,
            tape: "b",
            rule: Some(&rule),
        });
        assert_eq!(
            console_text(sink),
            "line: 3\ncommand: a = b\ncurrentString: b\n--------------------\n"
        );
    }

    #[test]
    fn test_console_color_keeps_text() {
        let mut sink = ConsoleSink::new(Vec::new(), true);
        sink.finish(&outcome("done"));
        let text = console_text(sink);
        assert!(text.contains("output:"), "got: {:?}", text);
        assert!(text.contains("done"), "got: {:?}", text);
        assert!(text.contains('\x1b'), "got: {:?}", text);
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_console_keeps_first_error() {
        let mut sink = ConsoleSink::new(FailingWriter, false);
        sink.start("a");
        sink.finish(&outcome("a"));
        let err = sink.into_result().err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_recording_sink() {
        let rule = compile_rule("a=b", 9).unwrap();
        let mut sink = RecordingSink::new();
        sink.start("a");
        sink.step(&StepReport {
            step: 1,
            tape: "b",
            rule: Some(&rule),
        });
        sink.step(&StepReport {
            step: 2,
            tape: "c",
            rule: None,
        });
        sink.finish(&outcome("c"));
        assert_eq!(sink.initial.as_deref(), Some("a"));
        assert_eq!(sink.tapes(), vec!["b", "c"]);
        assert_eq!(sink.steps[0].line, Some(9));
        assert_eq!(sink.steps[1].line, None);
        assert_eq!(sink.outcome.unwrap().tape, "c");
    }
}
