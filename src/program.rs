//! Rule sources and compiled programs.
//!
//! Rule text is line oriented. Lines whose first non-blank character is `#`
//! are comments, blank lines are ignored, and every other line is one rule.
//! Line numbers are 1-based and count every physical line, so diagnostics
//! point at the right place even when comments are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::code::Rule;
use crate::compiler::{ParseError, compile_rule};

/// Identifies a rule by its position in a [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub(crate) usize);

/// An ordered, read-only set of compiled rules. Earlier rules take priority.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    rules: Vec<Rule>,
}

impl Program {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Compile rule text. Stops at the first bad line; no partial program
    /// is ever returned.
    pub fn compile(source: &str) -> Result<Self, ParseError> {
        let rules = rule_lines(source)
            .map(|(line, text)| compile_rule(text, line))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(rules = rules.len(), "compiled program");
        Ok(Self { rules })
    }

    /// Read and compile a rule file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let program = Self::compile(&source)
            .with_context(|| format!("Failed to compile {}", path.display()))?;
        tracing::debug!(path = %path.display(), rules = program.len(), "loaded program");
        Ok(program)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.0]
    }

    pub fn ids(&self) -> impl Iterator<Item = RuleId> + '_ {
        (0..self.rules.len()).map(RuleId)
    }
}

/// Yield `(line_number, text)` for every rule line in `source`.
pub fn rule_lines(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source
        .lines()
        .enumerate()
        .map(|(idx, text)| (idx + 1, text))
        .filter(|(_, text)| {
            let trimmed = text.trim_start();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
}

/// Find a rule file given on the command line.
///
/// A path that exists is used as is. Otherwise `name` is tried as a bare
/// program name, first as `code/<name>.ab` and then as `<name>.ab`.
pub fn resolve_program_path(base: &Path, name: &str) -> Option<PathBuf> {
    let direct = base.join(name);
    if direct.is_file() {
        return Some(direct);
    }
    [
        base.join("code").join(format!("{name}.ab")),
        base.join(format!("{name}.ab")),
    ]
    .into_iter()
    .find(|candidate| candidate.is_file())
}
