use std::fmt::{self, Display};
use std::rc::Rc;

use crate::core::{Parser, ParserRef};
use crate::text;

/// Result slot carried by a [`ParseState`].
///
/// The set of shapes is closed: primitive matchers produce `Str`,
/// transforms may produce `Num`, and structural combinators produce
/// (possibly nested) `List`s of the other two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Num(i64),
    List(Vec<Value>),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Str(String::new())
    }
}

/// The single state value threaded through every combinator call.
///
/// A state is either exactly "ok" (`error` absent, `value` meaningful) or
/// exactly "failed" (`error` present, `value` reset and to be ignored).
/// The input is shared behind an `Rc` so cloning a state for backtracking
/// is cheap; the offset never moves backwards along a successful path and
/// never exceeds the input length.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseState {
    input: Rc<str>,
    offset: usize,
    value: Value,
    error: Option<String>,
}

impl ParseState {
    /// Fresh state at offset 0, ready to be fed into a grammar root.
    pub fn new(input: impl AsRef<str>) -> Self {
        Self {
            input: Rc::from(input.as_ref()),
            offset: 0,
            value: Value::default(),
            error: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The unconsumed tail of the input.
    pub fn rest(&self) -> &str {
        &self.input[self.offset..]
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Successful step: move the cursor forward and store the produced value.
    pub fn advance(self, by: usize, value: Value) -> Self {
        Self {
            offset: self.offset + by,
            value,
            error: None,
            ..self
        }
    }

    /// Replace the value without consuming input.
    pub fn with_value(self, value: Value) -> Self {
        Self { value, ..self }
    }

    /// Failed step: the offset stays where the attempt started.
    pub fn fail(self, error: impl Into<String>) -> Self {
        Self {
            value: Value::default(),
            error: Some(error.into()),
            ..self
        }
    }

    /// Replace the value with `f(value)`; unchanged when failed.
    pub fn map(self, f: impl FnOnce(Value) -> Value) -> Self {
        if self.error.is_some() {
            return self;
        }
        let value = f(self.value);
        Self { value, ..self }
    }

    /// Replace the error with `f(error)`; unchanged when ok.
    pub fn map_error(self, f: impl FnOnce(String) -> String) -> Self {
        match self.error {
            Some(error) => Self {
                error: Some(f(error)),
                ..self
            },
            None => self,
        }
    }

    /// Apply `f` to every leaf value, recursively, keeping the list
    /// nesting shape intact; unchanged when failed.
    pub fn map_nested(self, f: impl Fn(Value) -> Value) -> Self {
        fn apply(value: Value, f: &impl Fn(Value) -> Value) -> Value {
            match value {
                Value::List(items) => {
                    Value::List(items.into_iter().map(|item| apply(item, f)).collect())
                }
                leaf => f(leaf),
            }
        }
        self.map(|value| apply(value, &f))
    }

    /// Monadic bind: pick the next parser from the current value and run
    /// it on this state; unchanged when failed.
    pub fn chain(self, f: impl FnOnce(&Value) -> ParserRef) -> Self {
        if self.error.is_some() {
            return self;
        }
        let next = f(&self.value);
        next.run(self)
    }

    /// Collapse nested lists in the value into one flat list; unchanged
    /// when failed.
    pub fn flatten(self) -> Self {
        self.map(|value| Value::List(text::flatten_value(value)))
    }

    /// Bounded snippet of the input at the cursor, for diagnostics.
    pub fn snippet(&self) -> String {
        text::snippet_at(&self.input, 10, self.offset, true)
    }
}

impl Display for ParseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ input: \"{}\", offset: {}, value: {}",
            self.input,
            self.offset,
            text::render_value(&self.value, true)
        )?;
        match &self.error {
            Some(error) => write!(f, ", error: \"{}\" }}", error),
            None => write!(f, " }}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers;
    use crate::prelude::*;

    #[test]
    fn test_new_state_is_ok() {
        let state = ParseState::new("abc");
        assert!(!state.is_failed());
        assert_eq!(state.offset(), 0);
        assert_eq!(state.value(), &Value::str(""));
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_map_replaces_value() {
        let state = ParseState::new("42").advance(2, Value::str("42"));
        let state = state.map(|v| Value::Num(v.as_str().unwrap().parse().unwrap()));
        assert_eq!(state.value(), &Value::Num(42));
        assert_eq!(state.offset(), 2);
    }

    #[test]
    fn test_map_leaves_failure_untouched() {
        let state = ParseState::new("x").fail("boom");
        let state = state.map(|_| Value::Num(1));
        assert_eq!(state.error(), Some("boom"));
        assert_eq!(state.value(), &Value::default());
    }

    #[test]
    fn test_map_error() {
        let state = ParseState::new("x").fail("boom");
        let state = state.map_error(|e| format!("outer: {e}"));
        assert_eq!(state.error(), Some("outer: boom"));

        let ok = ParseState::new("x").map_error(|e| format!("outer: {e}"));
        assert!(!ok.is_failed());
    }

    #[test]
    fn test_map_nested_preserves_shape() {
        let nested = Value::list([
            Value::str("1"),
            Value::list([Value::str("2"), Value::str("3")]),
        ]);
        let state = ParseState::new("").with_value(nested);
        let state = state.map_nested(|leaf| match leaf {
            Value::Str(s) => Value::Num(s.parse().unwrap()),
            other => other,
        });
        assert_eq!(
            state.value(),
            &Value::list([
                Value::Num(1),
                Value::list([Value::Num(2), Value::Num(3)]),
            ])
        );
    }

    #[test]
    fn test_chain_runs_dependent_parser() {
        // The tag decides what the rest of the input must look like.
        let tagged = parsers::exact_one_of(["n", "s"])
            .to_ref()
            .chain(|value| match value.as_str() {
                Some("n") => parsers::digits().to_ref(),
                _ => parsers::letters().to_ref(),
            });
        let state = tagged.run(ParseState::new("n42"));
        assert_eq!(state.value(), &Value::str("42"));
        let state = tagged.run(ParseState::new("sab"));
        assert_eq!(state.value(), &Value::str("ab"));
    }

    #[test]
    fn test_flatten_collapses_nesting() {
        let nested = Value::list([
            Value::str("a"),
            Value::list([Value::str("b"), Value::list([Value::str("c")])]),
        ]);
        let state = ParseState::new("").with_value(nested).flatten();
        assert_eq!(
            state.value(),
            &Value::list([Value::str("a"), Value::str("b"), Value::str("c")])
        );
    }

    #[test]
    fn test_display_rendering() {
        let state = ParseState::new("ab").advance(2, Value::str("ab"));
        assert_eq!(
            state.to_string(),
            "{ input: \"ab\", offset: 2, value: \"ab\" }"
        );
        let failed = ParseState::new("ab").fail("no luck");
        assert_eq!(
            failed.to_string(),
            "{ input: \"ab\", offset: 0, value: \"\", error: \"no luck\" }"
        );
    }
}
