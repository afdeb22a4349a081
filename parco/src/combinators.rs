use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::core::{Parser, ParserRef};
use crate::state::{ParseState, Value};

/// Runs its children in order, threading the state through each, and
/// collects their values into a list. The first child failure is
/// propagated verbatim: the returned offset is the one the failing child
/// was invoked at. An empty child list succeeds with an empty list.
pub struct SequenceParser {
    parsers: Vec<ParserRef>,
}

impl SequenceParser {
    pub fn new(parsers: Vec<ParserRef>) -> Self {
        Self { parsers }
    }
}

impl Parser for SequenceParser {
    fn run(&self, mut state: ParseState) -> ParseState {
        if state.is_failed() {
            return state;
        }
        let mut results = Vec::with_capacity(self.parsers.len());
        for parser in &self.parsers {
            state = parser.run(state);
            if state.is_failed() {
                return state;
            }
            results.push(state.value().clone());
        }
        state.with_value(Value::List(results))
    }
}

/// Tries each alternative against the same starting state, in declaration
/// order, and returns the first success. A failed alternative's progress
/// is discarded entirely; when all fail, the diagnostic quotes the input
/// at the original offset and the children's own reasons are dropped.
pub struct ChoiceParser {
    parsers: Vec<ParserRef>,
}

impl ChoiceParser {
    pub fn new(parsers: Vec<ParserRef>) -> Self {
        Self { parsers }
    }
}

impl Parser for ChoiceParser {
    fn run(&self, state: ParseState) -> ParseState {
        if state.is_failed() {
            return state;
        }
        for parser in &self.parsers {
            let next = parser.run(state.clone());
            if !next.is_failed() {
                return next;
            }
        }
        let snippet = state.snippet();
        state.fail(format!("no alternative matched at \"{}\"", snippet))
    }
}

/// Repeats the child from the current state until it fails, discarding
/// the failed attempt, and succeeds with the (possibly empty) list of
/// collected values. Never fails of itself.
///
/// A child that can succeed without consuming input makes this loop
/// forever; guarding against that is the grammar author's job.
pub struct ManyParser {
    parser: ParserRef,
}

impl ManyParser {
    pub fn new(parser: ParserRef) -> Self {
        Self { parser }
    }
}

impl Parser for ManyParser {
    fn run(&self, mut state: ParseState) -> ParseState {
        if state.is_failed() {
            return state;
        }
        let mut results = vec![];
        loop {
            let next = self.parser.run(state.clone());
            if next.is_failed() {
                break;
            }
            results.push(next.value().clone());
            state = next;
        }
        state.with_value(Value::List(results))
    }
}

/// Like [`ManyParser`], but an empty result list is a failure.
pub struct Many1Parser {
    inner: ManyParser,
}

impl Many1Parser {
    pub fn new(parser: ParserRef) -> Self {
        Self {
            inner: ManyParser::new(parser),
        }
    }
}

impl Parser for Many1Parser {
    fn run(&self, state: ParseState) -> ParseState {
        let state = self.inner.run(state);
        if state.is_failed() {
            return state;
        }
        let matched_none = matches!(state.value().as_list(), Some(items) if items.is_empty());
        if matched_none {
            let snippet = state.snippet();
            state.fail(format!("unable to match any input at \"{}\"", snippet))
        } else {
            state
        }
    }
}

/// Left delimiter, content, right delimiter, threaded like a 3-element
/// sequence; on success only the content's value is kept.
pub struct BetweenParser {
    left: ParserRef,
    right: ParserRef,
    content: ParserRef,
}

impl BetweenParser {
    pub fn new(left: ParserRef, right: ParserRef, content: ParserRef) -> Self {
        Self {
            left,
            right,
            content,
        }
    }
}

impl Parser for BetweenParser {
    fn run(&self, state: ParseState) -> ParseState {
        if state.is_failed() {
            return state;
        }
        let state = self.left.run(state);
        let state = self.content.run(state);
        if state.is_failed() {
            return state;
        }
        let content_value = state.value().clone();
        let state = self.right.run(state);
        if state.is_failed() {
            return state;
        }
        state.with_value(content_value)
    }
}

/// Alternates a value parser and a separator parser; a failing value
/// parser ends the list without failing, a failing separator ends it
/// after the last value. Succeeds with the (possibly empty) list of
/// values; a trailing matched separator stays consumed.
pub struct SeparatedByParser {
    separator: ParserRef,
    value: ParserRef,
}

impl SeparatedByParser {
    pub fn new(separator: ParserRef, value: ParserRef) -> Self {
        Self { separator, value }
    }
}

impl Parser for SeparatedByParser {
    fn run(&self, mut state: ParseState) -> ParseState {
        if state.is_failed() {
            return state;
        }
        let mut results = vec![];
        loop {
            let wanted = self.value.run(state.clone());
            if wanted.is_failed() {
                break;
            }
            results.push(wanted.value().clone());
            state = wanted;
            let after_separator = self.separator.run(state.clone());
            if after_separator.is_failed() {
                break;
            }
            state = after_separator;
        }
        state.with_value(Value::List(results))
    }
}

/// Applies a pure transform to the wrapped parser's value on success.
pub struct MapParser {
    parser: ParserRef,
    f: Box<dyn Fn(Value) -> Value>,
}

impl MapParser {
    pub fn new(parser: ParserRef, f: impl Fn(Value) -> Value + 'static) -> Self {
        Self {
            parser,
            f: Box::new(f),
        }
    }
}

impl Parser for MapParser {
    fn run(&self, state: ParseState) -> ParseState {
        if state.is_failed() {
            return state;
        }
        self.parser.run(state).map(|value| (self.f)(value))
    }
}

/// Monadic bind: picks the next parser from the wrapped parser's value.
pub struct ChainParser {
    parser: ParserRef,
    f: Box<dyn Fn(&Value) -> ParserRef>,
}

impl ChainParser {
    pub fn new(parser: ParserRef, f: impl Fn(&Value) -> ParserRef + 'static) -> Self {
        Self {
            parser,
            f: Box::new(f),
        }
    }
}

impl Parser for ChainParser {
    fn run(&self, state: ParseState) -> ParseState {
        if state.is_failed() {
            return state;
        }
        self.parser.run(state).chain(|value| (self.f)(value))
    }
}

/// Collapses the wrapped parser's nested list value into one flat list.
pub struct FlattenParser {
    parser: ParserRef,
}

impl FlattenParser {
    pub fn new(parser: ParserRef) -> Self {
        Self { parser }
    }
}

impl Parser for FlattenParser {
    fn run(&self, state: ParseState) -> ParseState {
        if state.is_failed() {
            return state;
        }
        self.parser.run(state).flatten()
    }
}

/// Late-bound reference to another parser, for recursive grammar rules.
///
/// The slot holds a non-owning handle, so a rule can refer to an ancestor
/// of its own tree without leaking the cycle. Running before [`bind`] (or
/// after the target was dropped) fails with a configuration diagnostic;
/// rebinding while a parse is running is not supported.
///
/// [`bind`]: LazyParser::bind
pub struct LazyParser {
    slot: RefCell<Option<Weak<dyn Parser>>>,
}

impl LazyParser {
    pub fn unbound() -> Rc<Self> {
        Rc::new(Self {
            slot: RefCell::new(None),
        })
    }

    pub fn bind(&self, parser: &ParserRef) {
        *self.slot.borrow_mut() = Some(Rc::downgrade(parser));
    }
}

impl Parser for LazyParser {
    fn run(&self, state: ParseState) -> ParseState {
        if state.is_failed() {
            return state;
        }
        let bound = self.slot.borrow().as_ref().and_then(Weak::upgrade);
        match bound {
            Some(parser) => parser.run(state),
            None => state.fail("recursive parser used before being bound"),
        }
    }
}

/// Passes the state through unchanged; a placeholder default.
#[derive(Default)]
pub struct NoopParser;

impl Parser for NoopParser {
    fn run(&self, state: ParseState) -> ParseState {
        state
    }
}

pub mod parsers {
    use std::rc::Rc;

    use super::*;
    use crate::primitives::{
        CharClass, CharMatchParser, CharsParser, ExactParser, MaybeCharsParser,
    };

    pub fn exact(literal: impl Into<String>) -> ExactParser {
        ExactParser::new(literal)
    }

    /// Ordered choice over exact literals, first match wins.
    pub fn exact_one_of<I, S>(literals: I) -> ChoiceParser
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ChoiceParser::new(
            literals
                .into_iter()
                .map(|literal| ExactParser::new(literal).to_ref())
                .collect(),
        )
    }

    pub fn letter() -> CharMatchParser {
        CharMatchParser::new(CharClass::Letter)
    }

    pub fn digit() -> CharMatchParser {
        CharMatchParser::new(CharClass::Digit)
    }

    pub fn whitespace() -> CharMatchParser {
        CharMatchParser::new(CharClass::Whitespace)
    }

    pub fn char_matching(
        expected: impl AsRef<str>,
        predicate: impl Fn(char) -> bool + 'static,
    ) -> CharMatchParser {
        CharMatchParser::new(CharClass::custom(expected, predicate))
    }

    pub fn letters() -> CharsParser {
        CharsParser::new(CharClass::Letter)
    }

    pub fn digits() -> CharsParser {
        CharsParser::new(CharClass::Digit)
    }

    pub fn whitespaces() -> CharsParser {
        CharsParser::new(CharClass::Whitespace)
    }

    pub fn chars(
        expected: impl AsRef<str>,
        predicate: impl Fn(char) -> bool + 'static,
    ) -> CharsParser {
        CharsParser::new(CharClass::custom(expected, predicate))
    }

    pub fn maybe_letters() -> MaybeCharsParser {
        MaybeCharsParser::new(CharClass::Letter)
    }

    pub fn maybe_digits() -> MaybeCharsParser {
        MaybeCharsParser::new(CharClass::Digit)
    }

    pub fn maybe_whitespaces() -> MaybeCharsParser {
        MaybeCharsParser::new(CharClass::Whitespace)
    }

    pub fn maybe_chars(
        expected: impl AsRef<str>,
        predicate: impl Fn(char) -> bool + 'static,
    ) -> MaybeCharsParser {
        MaybeCharsParser::new(CharClass::custom(expected, predicate))
    }

    pub fn sequence(parsers: Vec<ParserRef>) -> SequenceParser {
        SequenceParser::new(parsers)
    }

    pub fn one_of(parsers: Vec<ParserRef>) -> ChoiceParser {
        ChoiceParser::new(parsers)
    }

    pub fn many(parser: ParserRef) -> ManyParser {
        ManyParser::new(parser)
    }

    pub fn many1(parser: ParserRef) -> Many1Parser {
        Many1Parser::new(parser)
    }

    pub fn between(left: ParserRef, right: ParserRef, content: ParserRef) -> BetweenParser {
        BetweenParser::new(left, right, content)
    }

    pub fn separated_by(separator: ParserRef, value: ParserRef) -> SeparatedByParser {
        SeparatedByParser::new(separator, value)
    }

    pub fn lazy() -> Rc<LazyParser> {
        LazyParser::unbound()
    }

    pub fn noop() -> NoopParser {
        NoopParser
    }
}
