//! Wildcard pattern compilation.
//!
//! The same dialect is used for file-name filters and for line content:
//!
//! | Syntax     | Meaning                                   |
//! |------------|-------------------------------------------|
//! | `*`        | any run of characters, including none     |
//! | `?`        | exactly one character                     |
//! | `[abc]`    | one character from the class (ranges ok)  |
//! | `[!abc]`   | one character not in the class            |
//! | `` `* `` / `\*` | a literal `*` (likewise `?`, `[`, `]`, `` ` ``, `\`) |
//!
//! Matching is case-insensitive and covers the whole input. A `[` without a
//! closing `]` is taken literally instead of being reported as an error, so
//! `a[unterminated` simply matches the text `a[unterminated`.
use regex::{Regex, RegexBuilder};
use std::fmt;

use crate::errors::{SearchError, SearchResult};

/// Characters that may follow an escape character to become literal.
const ESCAPABLE: &[char] = &['*', '?', '[', ']', '\\', '`'];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    AnyRun,
    AnyChar,
    Literal(char),
    Class { negated: bool, body: String },
}

/// A compiled, immutable wildcard matcher.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    source: String,
    regex: Regex,
    /// Unanchored matcher for the pattern minus its outer `*` runs, used to
    /// locate the interesting part of a matching line. `None` when nothing is
    /// left once the stars are stripped.
    core: Option<Regex>,
}

impl WildcardPattern {
    /// Compiles `pattern`. Fails only if the translated regex is rejected,
    /// for example on a reversed class range like `[z-a]`.
    pub fn new(pattern: &str) -> SearchResult<Self> {
        let tokens = tokenize(pattern);
        let regex = build_regex(&format!("^(?:{})$", translate(&tokens)), pattern)?;

        let start = tokens.iter().take_while(|t| **t == Token::AnyRun).count();
        let end = tokens.len()
            - tokens[start..]
                .iter()
                .rev()
                .take_while(|t| **t == Token::AnyRun)
                .count();
        let core = if start < end {
            Some(build_regex(&translate(&tokens[start..end]), pattern)?)
        } else {
            None
        };

        Ok(Self {
            source: pattern.to_string(),
            regex,
            core,
        })
    }

    /// Compiles every pattern in `patterns`, failing on the first bad one.
    pub fn compile_all(patterns: &[String]) -> SearchResult<Vec<Self>> {
        patterns.iter().map(|p| Self::new(p)).collect()
    }

    /// Whole-input, case-insensitive match.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Locates the pattern's core inside `text` as `(start, len)` measured in
    /// characters. Patterns made only of `*` locate at `(0, 0)`.
    pub fn find(&self, text: &str) -> Option<(usize, usize)> {
        match &self.core {
            None => Some((0, 0)),
            Some(core) => core.find(text).map(|m| {
                (
                    text[..m.start()].chars().count(),
                    m.as_str().chars().count(),
                )
            }),
        }
    }
}

impl fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn build_regex(expr: &str, pattern: &str) -> SearchResult<Regex> {
    RegexBuilder::new(expr)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| SearchError::invalid_pattern(format!("{}: {}", pattern, e)))
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => tokens.push(Token::AnyRun),
            '?' => tokens.push(Token::AnyChar),
            '\\' | '`' if chars.get(i + 1).is_some_and(|c| ESCAPABLE.contains(c)) => {
                tokens.push(Token::Literal(chars[i + 1]));
                i += 1;
            }
            '[' => match chars[i + 1..].iter().position(|&c| c == ']') {
                Some(offset) => {
                    let close = i + 1 + offset;
                    let raw: String = chars[i + 1..close].iter().collect();
                    let (negated, body) = match raw.strip_prefix('!') {
                        Some(rest) => (true, rest.to_string()),
                        None => (false, raw),
                    };
                    if body.is_empty() {
                        // `[]` and `[!]` have nothing to match against
                        tokens.extend(chars[i..=close].iter().map(|&c| Token::Literal(c)));
                    } else {
                        tokens.push(Token::Class { negated, body });
                    }
                    i = close;
                }
                None => tokens.push(Token::Literal('[')),
            },
            c => tokens.push(Token::Literal(c)),
        }
        i += 1;
    }

    tokens
}

fn translate(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut literal = String::new();

    for token in tokens {
        if let Token::Literal(c) = token {
            literal.push(*c);
            continue;
        }
        if !literal.is_empty() {
            out.push_str(&regex::escape(&literal));
            literal.clear();
        }
        match token {
            Token::AnyRun => out.push_str(".*"),
            Token::AnyChar => out.push('.'),
            Token::Class { negated, body } => {
                out.push('[');
                if *negated {
                    out.push('^');
                }
                for c in body.chars() {
                    // `-` stays bare so ranges keep working
                    if matches!(c, '\\' | '[' | ']' | '^' | '&' | '~') {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push(']');
            }
            Token::Literal(_) => {}
        }
    }

    if !literal.is_empty() {
        out.push_str(&regex::escape(&literal));
    }
    out
}
