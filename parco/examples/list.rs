use parco::parsers::*;
use parco::prelude::*;
use parco::text;

fn main() {
    // A bracketed, comma-separated list of numbers with optional padding,
    // e.g. "[1, 22, 333]".
    let number = between(
        maybe_whitespaces().to_ref(),
        maybe_whitespaces().to_ref(),
        digits().to_ref(),
    )
    .map(|v| Value::Num(v.as_str().unwrap().parse().unwrap()));
    let list = between(
        exact("[").to_ref(),
        exact("]").to_ref(),
        separated_by(exact(",").to_ref(), number.to_ref()).to_ref(),
    );

    let state = list.run(ParseState::new("[1, 22 ,333]"));
    match state.error() {
        Some(error) => eprintln!("{error}"),
        None => println!("{}", text::render_value(state.value(), false)),
    }
}
