use std::rc::Rc;

use crate::combinators::{ChainParser, FlattenParser, MapParser};
use crate::state::{ParseState, Value};

/// Shared handle to a parser node.
///
/// Grammar trees are built once out of `ParserRef`s and are immutable
/// afterwards, so the same tree can be reused for any number of
/// sequential parses. `Rc` lets a single node appear in several places
/// of the same grammar; it also makes the tree single-threaded by
/// construction.
pub type ParserRef = Rc<dyn Parser>;

/// The one capability every combinator implements: consume a state,
/// produce the next one.
///
/// Every implementation must pass an already-failed state through
/// unchanged, unless failure handling is its documented purpose (choice,
/// the zero-or-more repetitions).
pub trait Parser {
    fn run(&self, state: ParseState) -> ParseState;

    /// Apply a pure transform to this parser's value on success.
    fn map<F>(self, f: F) -> MapParser
    where
        Self: Sized + 'static,
        F: Fn(Value) -> Value + 'static,
    {
        MapParser::new(Rc::new(self), f)
    }

    /// Pick the next parser from this parser's value and run it.
    fn chain<F>(self, f: F) -> ChainParser
    where
        Self: Sized + 'static,
        F: Fn(&Value) -> ParserRef + 'static,
    {
        ChainParser::new(Rc::new(self), f)
    }

    /// Collapse this parser's nested list value into one flat list.
    fn flatten(self) -> FlattenParser
    where
        Self: Sized + 'static,
    {
        FlattenParser::new(Rc::new(self))
    }

    fn to_ref(self) -> ParserRef
    where
        Self: Sized + 'static,
    {
        Rc::new(self)
    }
}

impl Parser for ParserRef {
    fn run(&self, state: ParseState) -> ParseState {
        self.as_ref().run(state)
    }
}
