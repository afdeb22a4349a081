pub mod combinators;
pub mod core;
pub mod primitives;
pub mod state;
pub mod text;

pub use combinators::parsers;

pub mod prelude {
    pub use crate::core::{Parser, ParserRef};
    pub use crate::state::{ParseState, Value};
}
