//! Rewrite engine for compiled rule programs.
//!
//! Each step scans the active rules in priority order, picks the first one
//! whose left pattern matches the tape, deletes the leftmost literal
//! occurrence of that pattern and puts the right-hand text back. A run ends
//! when a `(return)` rule fires, when no rule matches, or when the step
//! ceiling is reached. None of these is an error.
//!
//! Offsets are char indices. The insertion point for an unmodified right side
//! is the match offset taken *before* the deletion, applied to the tape
//! *after* it. For anchored left patterns the deleted occurrence is not
//! necessarily the anchored one, so the two can disagree. Existing programs
//! may depend on that, so it is kept as is.

use ropey::Rope;

use crate::code::{LeftModifier, Pattern, Replacement, RightModifier, Rule};
use crate::config::RunConfig;
use crate::program::{Program, RuleId};
use crate::sink::{NullSink, StepReport, StepSink};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A rule with a `(return)` right side fired.
    Returned,
    /// No active rule matched the tape.
    Exhausted,
    /// The step ceiling was reached.
    StepLimitReached,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub tape: String,
    pub termination: Termination,
    /// Number of rules applied.
    pub steps: usize,
}

/// Result of asking an [`Execution`] for one more step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<'p> {
    /// A rule fired and the tape changed accordingly.
    Applied(&'p Rule),
    /// The run is over. Repeated calls keep returning this.
    Finished(Termination),
}

/// Rules still eligible to fire in the current run, in priority order.
#[derive(Debug, Clone)]
struct ActiveRules {
    ids: Vec<RuleId>,
}

impl ActiveRules {
    fn new(program: &Program) -> Self {
        Self {
            ids: program.ids().collect(),
        }
    }

    fn iter(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.ids.iter().copied()
    }

    /// Remove a rule for the rest of the run.
    fn retire(&mut self, id: RuleId) {
        self.ids.retain(|&active| active != id);
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}

/// State of one run of a program over one tape.
///
/// The program is only borrowed; every execution has its own rule list and
/// tape, so any number of them can run from the same program.
#[derive(Debug)]
pub struct Execution<'p> {
    program: &'p Program,
    active: ActiveRules,
    tape: Rope,
    steps: usize,
    max_steps: usize,
    finished: Option<Termination>,
}

impl<'p> Execution<'p> {
    pub fn new(program: &'p Program, initial_tape: &str, max_steps: usize) -> Self {
        Self {
            program,
            active: ActiveRules::new(program),
            tape: Rope::from_str(initial_tape),
            steps: 0,
            max_steps,
            finished: None,
        }
    }

    pub fn tape(&self) -> String {
        self.tape.to_string()
    }

    /// Number of rules applied so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of rules that can still fire.
    pub fn active_rules(&self) -> usize {
        self.active.len()
    }

    /// Apply the highest-priority matching rule, or report why the run is over.
    pub fn step(&mut self) -> Step<'p> {
        if let Some(termination) = self.finished {
            return Step::Finished(termination);
        }
        if self.steps >= self.max_steps {
            return self.finish(Termination::StepLimitReached);
        }

        let haystack = self.tape.to_string();
        let program = self.program;
        let found = self.active.iter().find_map(|id| {
            find_match(&program.rule(id).left, &self.tape, &haystack).map(|start| (id, start))
        });
        let Some((id, match_start)) = found else {
            return self.finish(Termination::Exhausted);
        };

        let rule = program.rule(id);
        tracing::debug!(line = rule.source_line, rule = %rule, match_start, "rule fired");
        if rule.is_once() {
            self.active.retire(id);
            tracing::debug!(line = rule.source_line, "rule retired");
        }

        consume(&mut self.tape, &haystack, &rule.left.content);
        let halted = replace(&mut self.tape, &rule.right, match_start);
        self.steps += 1;
        tracing::trace!(step = self.steps, tape = %self.tape, "step applied");

        if halted {
            self.finished = Some(Termination::Returned);
            tracing::debug!(steps = self.steps, "run returned");
        }
        Step::Applied(rule)
    }

    fn finish(&mut self, termination: Termination) -> Step<'p> {
        tracing::debug!(steps = self.steps, ?termination, "run finished");
        self.finished = Some(termination);
        Step::Finished(termination)
    }

    /// Run to completion, reporting each step to `sink`.
    pub fn run_to_end(mut self, verbose: bool, sink: &mut dyn StepSink) -> RunOutcome {
        let termination = loop {
            match self.step() {
                Step::Applied(rule) => {
                    let tape = self.tape();
                    sink.step(&StepReport {
                        step: self.steps,
                        tape: &tape,
                        rule: verbose.then_some(rule),
                    });
                }
                Step::Finished(termination) => break termination,
            }
        };
        RunOutcome {
            tape: self.tape(),
            termination,
            steps: self.steps,
        }
    }
}

/// Offset at which `pattern` matches the tape, if it does.
fn find_match(pattern: &Pattern, tape: &Rope, haystack: &str) -> Option<usize> {
    let content = pattern.content.as_str();
    if content.is_empty() {
        return Some(0);
    }
    match pattern.modifier {
        LeftModifier::None | LeftModifier::Once => {
            haystack.find(content).map(|byte| tape.byte_to_char(byte))
        }
        LeftModifier::Start => haystack.starts_with(content).then_some(0),
        LeftModifier::End => haystack
            .ends_with(content)
            .then(|| tape.len_chars() - content.chars().count()),
    }
}

/// Delete the leftmost occurrence of `content`, wherever the match was.
fn consume(tape: &mut Rope, haystack: &str, content: &str) {
    if content.is_empty() {
        return;
    }
    if let Some(byte) = haystack.find(content) {
        let start = tape.byte_to_char(byte);
        tape.remove(start..start + content.chars().count());
    }
}

/// Put the right-hand text back. Returns `true` if the run must stop.
fn replace(tape: &mut Rope, right: &Replacement, match_start: usize) -> bool {
    let insert_at = match right.modifier {
        RightModifier::Return => {
            *tape = Rope::from_str(&right.content);
            return true;
        }
        RightModifier::Start => 0,
        RightModifier::End => tape.len_chars(),
        RightModifier::None => match_start,
    };
    if tape.len_chars() == 0 {
        *tape = Rope::from_str(&right.content);
    } else {
        tape.insert(insert_at.min(tape.len_chars()), &right.content);
    }
    false
}

/// Run `program` over `initial_tape` with the given settings, reporting to `sink`.
pub fn run_with_sink(
    program: &Program,
    initial_tape: &str,
    config: &RunConfig,
    sink: &mut dyn StepSink,
) -> RunOutcome {
    sink.start(initial_tape);
    let outcome =
        Execution::new(program, initial_tape, config.max_steps).run_to_end(config.verbose, sink);
    sink.finish(&outcome);
    outcome
}

/// Run `program` over `initial_tape` and return the final tape.
pub fn run(program: &Program, initial_tape: &str, max_steps: usize) -> String {
    let config = RunConfig::default().with_max_steps(max_steps);
    run_with_sink(program, initial_tape, &config, &mut NullSink).tape
}
