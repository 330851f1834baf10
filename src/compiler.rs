//! Compiler for single rewrite rule lines.
//!
//! A rule line has the shape `[(modifier)]left=[(modifier)]right`. All
//! whitespace is insignificant and is removed before anything else happens.
//! The left side accepts `once`, `start` and `end`; the right side accepts
//! `start`, `end` and `return`. Parentheses are reserved for the modifier
//! token and may not appear in rule content.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use itertools::Itertools;
use phf::{Map, phf_map};

use crate::code::{LeftModifier, Pattern, Replacement, RightModifier, Rule, Side};

/// What was wrong with a rule line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The line did not contain exactly one `=`.
    MissingOrExtraEqualSign,
    /// Unknown modifier word, or a parenthesis outside the modifier token.
    IllegalModifierOrParens { side: Side },
}

/// A rule line that failed to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// 1-based line number of the offending rule.
    pub line: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: usize) -> Self {
        Self { kind, line }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParseErrorKind::MissingOrExtraEqualSign => {
                write!(f, "Invalid rule (equal sign) at line: {}", self.line)
            }
            ParseErrorKind::IllegalModifierOrParens { side } => write!(
                f,
                "Invalid rule (illegal modifier or parenthesis on {side} side) at line: {}",
                self.line
            ),
        }
    }
}

impl std::error::Error for ParseError {}

const LEFT_MODIFIERS: Map<&'static str, LeftModifier> = phf_map! {
    "end" => LeftModifier::End,
    "once" => LeftModifier::Once,
    "start" => LeftModifier::Start,
};

const RIGHT_MODIFIERS: Map<&'static str, RightModifier> = phf_map! {
    "end" => RightModifier::End,
    "return" => RightModifier::Return,
    "start" => RightModifier::Start,
};

/// Compile one rule line into a [`Rule`].
pub fn compile_rule(raw_line: &str, line_number: usize) -> Result<Rule, ParseError> {
    let stripped: String = raw_line.chars().filter(|ch| !ch.is_whitespace()).collect();

    let Some((left, right)) = stripped.split('=').collect_tuple() else {
        return Err(ParseError::new(
            ParseErrorKind::MissingOrExtraEqualSign,
            line_number,
        ));
    };

    let (content, modifier) = FieldCompiler::new(left)
        .compile(&LEFT_MODIFIERS)
        .ok_or_else(|| illegal(Side::Left, line_number))?;
    let left = Pattern { content, modifier };

    let (content, modifier) = FieldCompiler::new(right)
        .compile(&RIGHT_MODIFIERS)
        .ok_or_else(|| illegal(Side::Right, line_number))?;
    let right = Replacement { content, modifier };

    Ok(Rule {
        left,
        right,
        source_line: line_number,
        raw_text: raw_line.trim_end_matches(['\r', '\n']).to_string(),
    })
}

fn illegal(side: Side, line: usize) -> ParseError {
    ParseError::new(ParseErrorKind::IllegalModifierOrParens { side }, line)
}

/// Splits one side of a rule into its optional modifier and its content.
struct FieldCompiler<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> FieldCompiler<'a> {
    fn new(field: &'a str) -> Self {
        Self {
            chars: field.chars().peekable(),
        }
    }

    /// Returns `None` if the field is malformed.
    fn compile<M: Copy + Default>(mut self, words: &Map<&'static str, M>) -> Option<(String, M)> {
        let modifier = match self.parse_modifier_word()? {
            Some(word) => *words.get(word.as_str())?,
            None => M::default(),
        };
        let content: String = self.chars.collect();
        if content.contains(['(', ')']) {
            return None;
        }
        Some((content, modifier))
    }

    /// Parse a leading `(word)` token. The outer `Option` is `None` on an
    /// unclosed token; the inner one is `None` when there is no token.
    fn parse_modifier_word(&mut self) -> Option<Option<String>> {
        if self.chars.peek() != Some(&'(') {
            return Some(None);
        }
        self.chars.next(); // consume '('
        let word: String = self.chars.peeking_take_while(|&ch| ch != ')').collect();
        match self.chars.next() {
            Some(')') => Some(Some(word)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn compile_ok(input: &str) -> Rule {
        compile_rule(input, 1).unwrap()
    }

    fn compile_err(input: &str) -> ParseErrorKind {
        compile_rule(input, 7).unwrap_err().kind
    }

    // --- Plain rules ---

    #[test]
    fn test_plain_rule() {
        let rule = compile_ok("a=b");
        assert_eq!(rule.left.content, "a");
        assert_eq!(rule.left.modifier, LeftModifier::None);
        assert_eq!(rule.right.content, "b");
        assert_eq!(rule.right.modifier, RightModifier::None);
        assert_eq!(rule.source_line, 1);
    }

    #[test]
    fn test_whitespace_is_stripped() {
        let rule = compile_ok("  a b = c\td \n");
        assert_eq!(rule.left.content, "ab");
        assert_eq!(rule.right.content, "cd");
        assert_eq!(rule.raw_text, "  a b = c\td ");
    }

    #[test]
    fn test_empty_sides() {
        let rule = compile_ok("=");
        assert_eq!(rule.left, Pattern::default());
        assert_eq!(rule.right, Replacement::default());

        let rule = compile_ok("abc=");
        assert_eq!(rule.left.content, "abc");
        assert_eq!(rule.right.content, "");

        let rule = compile_ok("=abc");
        assert_eq!(rule.left.content, "");
        assert_eq!(rule.right.content, "abc");
    }

    // --- Modifiers ---

    #[test]
    fn test_left_modifiers() {
        assert_eq!(compile_ok("(once)a=b").left.modifier, LeftModifier::Once);
        assert_eq!(compile_ok("(start)a=b").left.modifier, LeftModifier::Start);
        assert_eq!(compile_ok("(end)a=b").left.modifier, LeftModifier::End);
        assert_eq!(compile_ok("(once)a=b").left.content, "a");
    }

    #[test]
    fn test_right_modifiers() {
        assert_eq!(compile_ok("a=(start)b").right.modifier, RightModifier::Start);
        assert_eq!(compile_ok("a=(end)b").right.modifier, RightModifier::End);
        assert_eq!(compile_ok("a=(return)b").right.modifier, RightModifier::Return);
        assert_eq!(compile_ok("a=(return)b").right.content, "b");
    }

    #[test]
    fn test_modifier_with_empty_content() {
        let rule = compile_ok("(start)=(return)");
        assert_eq!(rule.left.modifier, LeftModifier::Start);
        assert_eq!(rule.left.content, "");
        assert_eq!(rule.right.modifier, RightModifier::Return);
        assert_eq!(rule.right.content, "");
    }

    #[test]
    fn test_modifier_with_inner_whitespace() {
        let rule = compile_ok("( once ) a = ( end ) b");
        assert_eq!(rule.left.modifier, LeftModifier::Once);
        assert_eq!(rule.right.modifier, RightModifier::End);
    }

    // --- Error cases ---

    #[test]
    fn test_missing_equal_sign() {
        assert_eq!(compile_err("ab"), ParseErrorKind::MissingOrExtraEqualSign);
        assert_eq!(compile_err(""), ParseErrorKind::MissingOrExtraEqualSign);
    }

    #[test]
    fn test_extra_equal_sign() {
        assert_eq!(compile_err("a=b=c"), ParseErrorKind::MissingOrExtraEqualSign);
        assert_eq!(compile_err("=="), ParseErrorKind::MissingOrExtraEqualSign);
    }

    #[test]
    fn test_right_only_modifier_on_left() {
        assert_eq!(
            compile_err("(return)a=b"),
            ParseErrorKind::IllegalModifierOrParens { side: Side::Left }
        );
    }

    #[test]
    fn test_left_only_modifier_on_right() {
        assert_eq!(
            compile_err("a=(once)b"),
            ParseErrorKind::IllegalModifierOrParens { side: Side::Right }
        );
    }

    #[test]
    fn test_unknown_modifier() {
        assert_eq!(
            compile_err("(twice)a=b"),
            ParseErrorKind::IllegalModifierOrParens { side: Side::Left }
        );
        assert_eq!(
            compile_err("(ONCE)a=b"),
            ParseErrorKind::IllegalModifierOrParens { side: Side::Left }
        );
    }

    #[test]
    fn test_stray_parens_in_content() {
        assert_eq!(
            compile_err("a(b=c"),
            ParseErrorKind::IllegalModifierOrParens { side: Side::Left }
        );
        assert_eq!(
            compile_err("a=c)"),
            ParseErrorKind::IllegalModifierOrParens { side: Side::Right }
        );
        assert_eq!(
            compile_err("(once)(once)a=b"),
            ParseErrorKind::IllegalModifierOrParens { side: Side::Left }
        );
    }

    #[test]
    fn test_unclosed_modifier() {
        assert_eq!(
            compile_err("(oncea=b"),
            ParseErrorKind::IllegalModifierOrParens { side: Side::Left }
        );
    }

    #[test]
    fn test_error_carries_line_and_message() {
        let err = compile_rule("a=b=c", 12).unwrap_err();
        assert_eq!(err.line, 12);
        assert_eq!(err.to_string(), "Invalid rule (equal sign) at line: 12");

        let err = compile_rule("a=(x)b", 3).unwrap_err();
        assert!(err.to_string().contains("right side"), "got: {}", err);
        assert!(err.to_string().ends_with("line: 3"), "got: {}", err);
    }

    // --- Properties ---

    fn left_word() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just(""), Just("(once)"), Just("(start)"), Just("(end)")]
    }

    fn right_word() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just(""), Just("(start)"), Just("(end)"), Just("(return)")]
    }

    proptest! {
        /// Well-formed rules compile and print back to their stripped text.
        #[test]
        fn well_formed_rules_round_trip(
            lm in left_word(),
            left in "[a-z0-9#]{0,6}",
            rm in right_word(),
            right in "[A-Za-z0-9]{0,6}",
            pad in "[ \t]{0,3}",
        ) {
            let source = format!("{pad}{lm}{left}{pad}={pad}{rm}{right}{pad}");
            let rule = compile_rule(&source, 1).unwrap();
            prop_assert_eq!(rule.to_string(), format!("{lm}{left}={rm}{right}"));
        }

        /// Anything without exactly one `=` is rejected as such.
        #[test]
        fn wrong_equal_count_is_rejected(parts in prop::collection::vec("[a-z()]{0,4}", 0..5)) {
            prop_assume!(parts.len() != 2);
            let source = parts.join("=");
            prop_assume!(source.matches('=').count() != 1);
            prop_assert_eq!(
                compile_rule(&source, 1).unwrap_err().kind,
                ParseErrorKind::MissingOrExtraEqualSign
            );
        }

        /// A parenthesis inside the content is always rejected.
        #[test]
        fn stray_paren_is_rejected(
            lm in left_word(),
            before in "[a-z]{0,3}",
            paren in "[()]",
            after in "[a-z]{0,3}",
        ) {
            let source = format!("{lm}{before}{paren}{after}=x");
            let is_illegal = matches!(
                compile_rule(&source, 1).unwrap_err().kind,
                ParseErrorKind::IllegalModifierOrParens { side: Side::Left }
            );
            prop_assert!(is_illegal);
        }
    }
}
