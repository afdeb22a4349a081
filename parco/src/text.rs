//! String and value helpers the combinators lean on: prefix matching,
//! nested-list flattening, debug rendering and diagnostic snippets.

use itertools::Itertools;
use unicode_segmentation::UnicodeSegmentation;

use crate::state::Value;

/// True iff `needle` occurs at byte `offset` in `haystack` without
/// running past its end.
pub fn starts_with_at(haystack: &str, needle: &str, offset: usize) -> bool {
    haystack
        .get(offset..)
        .is_some_and(|rest| rest.starts_with(needle))
}

/// Recursively collapse nested lists into one flat list of leaves; a
/// non-list value becomes a singleton.
pub fn flatten_value(value: Value) -> Vec<Value> {
    match value {
        Value::List(items) => items.into_iter().flat_map(flatten_value).collect(),
        leaf => vec![leaf],
    }
}

/// Debug rendering of a value. Total over the closed [`Value`] set, so
/// there is no "unrecognized kind" escape hatch to fail through.
pub fn render_value(value: &Value, quote_strings: bool) -> String {
    match value {
        Value::Str(s) if quote_strings => format!("\"{s}\""),
        Value::Str(s) => s.clone(),
        Value::Num(n) => n.to_string(),
        Value::List(items) => format!(
            "[{}]",
            items
                .iter()
                .map(|item| render_value(item, quote_strings))
                .join(", ")
        ),
    }
}

/// At most `max_graphemes` graphemes of `text` starting at byte `from`,
/// with a trailing ellipsis when truncated. Used to quote input in
/// failure diagnostics.
pub fn snippet_at(text: &str, max_graphemes: usize, from: usize, with_ellipsis: bool) -> String {
    let Some(rest) = text.get(from..) else {
        return String::new();
    };
    let mut graphemes = rest.graphemes(true);
    let taken: String = graphemes.by_ref().take(max_graphemes).collect();
    if with_ellipsis && graphemes.next().is_some() {
        taken + "..."
    } else {
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_at() {
        assert!(starts_with_at("hello", "ell", 1));
        assert!(!starts_with_at("hello", "ell", 2));
        assert!(!starts_with_at("hello", "lo?", 3));
        assert!(starts_with_at("hello", "", 5));
        assert!(!starts_with_at("hello", "x", 6));
    }

    #[test]
    fn test_flatten_value() {
        let nested = Value::list([
            Value::str("a"),
            Value::list([Value::str("b"), Value::list([Value::str("c")])]),
            Value::Num(4),
        ]);
        let flat = flatten_value(nested);
        assert_eq!(
            flat,
            vec![
                Value::str("a"),
                Value::str("b"),
                Value::str("c"),
                Value::Num(4)
            ]
        );
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let nested = Value::list([
            Value::list([Value::str("a"), Value::list([Value::str("b")])]),
            Value::str("c"),
        ]);
        let once = flatten_value(nested);
        let twice = flatten_value(Value::List(once.clone()));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_flatten_non_list_becomes_singleton() {
        assert_eq!(flatten_value(Value::str("x")), vec![Value::str("x")]);
    }

    #[test]
    fn test_render_value() {
        let value = Value::list([Value::str("a"), Value::Num(2), Value::list([])]);
        assert_eq!(render_value(&value, true), "[\"a\", 2, []]");
        assert_eq!(render_value(&value, false), "[a, 2, []]");
    }

    #[test]
    fn test_snippet_at() {
        assert_eq!(snippet_at("0123456789abc", 10, 0, true), "0123456789...");
        assert_eq!(snippet_at("0123456789", 10, 0, true), "0123456789");
        assert_eq!(snippet_at("abcdef", 10, 3, true), "def");
        assert_eq!(snippet_at("abcdef", 2, 3, false), "de");
        assert_eq!(snippet_at("abc", 10, 7, true), "");
    }
}
