use clap::Parser;
use parco::core::Parser as _;
use parco::state::ParseState;
use serde::Serialize;
use std::path::PathBuf;

mod lang;

#[derive(Parser)]
#[command(version, about = "Evaluate LISP-like prefix arithmetic, e.g. \"(+ 1 2)\"")]
struct CliArgs {
    /// Expression to evaluate; read from --file when omitted
    expression: Option<String>,
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Print the parse tree instead of evaluating it
    #[arg(long)]
    ast: bool,
    #[arg(short, long)]
    pretty: bool,
}

#[derive(Serialize)]
struct Evaluation {
    expression: String,
    value: i64,
}

fn main() -> Result<(), String> {
    let args = CliArgs::parse();
    let source = match (args.expression, args.file) {
        (Some(expression), _) => expression,
        (None, Some(file)) => std::fs::read_to_string(&file)
            .map_err(|e| format!("{}: {e}", file.display()))?
            .trim()
            .to_string(),
        (None, None) => return Err("no expression given".to_string()),
    };

    let state = lang::expression_grammar().run(ParseState::new(&source));
    if let Some(error) = state.error() {
        return Err(error.to_string());
    }

    let output = if args.ast {
        lang::to_json(state.value())
    } else {
        let value = lang::eval(state.value())?;
        serde_json::to_value(Evaluation {
            expression: source,
            value,
        })
        .unwrap()
    };

    println!(
        "{}",
        if args.pretty {
            serde_json::to_string_pretty(&output).unwrap()
        } else {
            serde_json::to_string(&output).unwrap()
        }
    );

    Ok(())
}
