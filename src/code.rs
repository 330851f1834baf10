//! Compiled representation of rewrite rules.

use std::fmt;

/// Which side of the `=` a rule field sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Modifier controlling how the left pattern is searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LeftModifier {
    /// Leftmost occurrence anywhere in the tape.
    #[default]
    None,
    /// As `None`, but the rule is retired after it first fires.
    Once,
    /// Must occur at the start of the tape.
    Start,
    /// Must occur at the end of the tape.
    End,
}

impl LeftModifier {
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            LeftModifier::None => None,
            LeftModifier::Once => Some("once"),
            LeftModifier::Start => Some("start"),
            LeftModifier::End => Some("end"),
        }
    }
}

/// Modifier controlling where the replacement goes, or whether the run stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RightModifier {
    /// Insert where the left pattern was found.
    #[default]
    None,
    /// Insert at the start of the tape.
    Start,
    /// Append to the end of the tape.
    End,
    /// Replace the whole tape and halt.
    Return,
}

impl RightModifier {
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            RightModifier::None => None,
            RightModifier::Start => Some("start"),
            RightModifier::End => Some("end"),
            RightModifier::Return => Some("return"),
        }
    }
}

/// Left-hand side of a rule: the text to look for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pattern {
    pub content: String,
    pub modifier: LeftModifier,
}

/// Right-hand side of a rule: the text to put back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Replacement {
    pub content: String,
    pub modifier: RightModifier,
}

/// A single compiled rewrite rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub left: Pattern,
    pub right: Replacement,
    /// 1-based line in the rule source.
    pub source_line: usize,
    /// The line as written, for diagnostics.
    pub raw_text: String,
}

impl Rule {
    pub fn is_once(&self) -> bool {
        self.left.modifier == LeftModifier::Once
    }
}

fn write_field(f: &mut fmt::Formatter<'_>, keyword: Option<&str>, content: &str) -> fmt::Result {
    if let Some(word) = keyword {
        write!(f, "({word})")?;
    }
    write!(f, "{content}")
}

/// Canonical rule text, equivalent to the whitespace-stripped source line.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_field(f, self.left.modifier.keyword(), &self.left.content)?;
        write!(f, "=")?;
        write_field(f, self.right.modifier.keyword(), &self.right.content)
    }
}
