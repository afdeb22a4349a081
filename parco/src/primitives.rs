use std::rc::Rc;

use crate::core::Parser;
use crate::state::{ParseState, Value};
use crate::text;

/// Built-in character classes plus an arbitrary user predicate. Replaces
/// regex-backed classes with stateless predicates; `expected` is the
/// phrase quoted in mismatch diagnostics.
#[derive(Clone)]
pub enum CharClass {
    Letter,
    Digit,
    Whitespace,
    Custom {
        expected: Rc<str>,
        predicate: Rc<dyn Fn(char) -> bool>,
    },
}

impl CharClass {
    pub fn custom(expected: impl AsRef<str>, predicate: impl Fn(char) -> bool + 'static) -> Self {
        CharClass::Custom {
            expected: Rc::from(expected.as_ref()),
            predicate: Rc::new(predicate),
        }
    }

    pub fn matches(&self, c: char) -> bool {
        match self {
            CharClass::Letter => c.is_ascii_alphabetic(),
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::Whitespace => c.is_whitespace(),
            CharClass::Custom { predicate, .. } => predicate(c),
        }
    }

    pub fn expected(&self) -> &str {
        match self {
            CharClass::Letter => "a letter",
            CharClass::Digit => "a digit",
            CharClass::Whitespace => "whitespace",
            CharClass::Custom { expected, .. } => expected,
        }
    }
}

/// Matches a fixed literal at the cursor; value is the literal itself.
pub struct ExactParser {
    literal: String,
}

impl ExactParser {
    pub fn new(literal: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
        }
    }
}

impl Parser for ExactParser {
    fn run(&self, state: ParseState) -> ParseState {
        if state.is_failed() {
            return state;
        }
        if state.offset() >= state.input().len() {
            return state.fail(format!(
                "unexpected end of input: expected \"{}\"",
                self.literal
            ));
        }
        if text::starts_with_at(state.input(), &self.literal, state.offset()) {
            let len = self.literal.len();
            let value = Value::str(&self.literal);
            state.advance(len, value)
        } else {
            let snippet = state.snippet();
            state.fail(format!(
                "expected \"{}\" but found \"{}\"",
                self.literal, snippet
            ))
        }
    }
}

/// Matches a single character of a [`CharClass`]; value is that character
/// as a one-character string.
pub struct CharMatchParser {
    class: CharClass,
}

impl CharMatchParser {
    pub fn new(class: CharClass) -> Self {
        Self { class }
    }
}

impl Parser for CharMatchParser {
    fn run(&self, state: ParseState) -> ParseState {
        if state.is_failed() {
            return state;
        }
        let first = state.rest().chars().next();
        match first {
            None => state.fail(format!(
                "unexpected end of input: expected {}",
                self.class.expected()
            )),
            Some(c) if self.class.matches(c) => {
                state.advance(c.len_utf8(), Value::Str(c.to_string()))
            }
            Some(_) => {
                let snippet = state.snippet();
                state.fail(format!(
                    "expected {} but found \"{}\"",
                    self.class.expected(),
                    snippet
                ))
            }
        }
    }
}

// Shared repetition loop for the run parsers. Attempts are made on state
// clones, so a failed attempt leaves the cursor where the last success
// ended.
fn match_run(matcher: &CharMatchParser, mut state: ParseState) -> (ParseState, String) {
    let mut matched = String::new();
    loop {
        let next = matcher.run(state.clone());
        if next.is_failed() {
            break;
        }
        if let Some(s) = next.value().as_str() {
            matched.push_str(s);
        }
        state = next;
    }
    (state, matched)
}

/// One-or-more characters of a class, concatenated into a single string.
pub struct CharsParser {
    matcher: CharMatchParser,
}

impl CharsParser {
    pub fn new(class: CharClass) -> Self {
        Self {
            matcher: CharMatchParser::new(class),
        }
    }
}

impl Parser for CharsParser {
    fn run(&self, state: ParseState) -> ParseState {
        if state.is_failed() {
            return state;
        }
        let (state, matched) = match_run(&self.matcher, state);
        if matched.is_empty() {
            let snippet = state.snippet();
            state.fail(format!("unable to match any input at \"{}\"", snippet))
        } else {
            state.with_value(Value::Str(matched))
        }
    }
}

/// Zero-or-more characters of a class; an empty run is a success with an
/// empty string value. Never fails on input content, though it still
/// passes an upstream failure through.
pub struct MaybeCharsParser {
    matcher: CharMatchParser,
}

impl MaybeCharsParser {
    pub fn new(class: CharClass) -> Self {
        Self {
            matcher: CharMatchParser::new(class),
        }
    }
}

impl Parser for MaybeCharsParser {
    fn run(&self, state: ParseState) -> ParseState {
        if state.is_failed() {
            return state;
        }
        let (state, matched) = match_run(&self.matcher, state);
        state.with_value(Value::Str(matched))
    }
}
