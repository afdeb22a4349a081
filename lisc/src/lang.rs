use std::rc::Rc;

use parco::parsers::*;
use parco::prelude::*;

/// Grammar for LISP-like prefix arithmetic: `(op lhs rhs)` where `op` is
/// one of `+ - * / % pow`, operands are digit runs or nested expressions,
/// and `(`/`[` brackets may be mixed freely.
pub fn expression_grammar() -> ParserRef {
    let recur = lazy();

    let operand: ParserRef = one_of(vec![digits().to_ref(), recur.clone()]).to_ref();
    let operator = exact_one_of(["+", "-", "*", "/", "%", "pow"]).to_ref();

    let open = sequence(vec![
        char_matching("an opening bracket", |c| c == '(' || c == '[').to_ref(),
        maybe_whitespaces().to_ref(),
    ])
    .to_ref();
    let close = sequence(vec![
        maybe_whitespaces().to_ref(),
        char_matching("a closing bracket", |c| c == ')' || c == ']').to_ref(),
    ])
    .to_ref();

    let body = sequence(vec![
        operator,
        between(
            whitespaces().to_ref(),
            whitespaces().to_ref(),
            Rc::clone(&operand),
        )
        .to_ref(),
        operand,
    ])
    .to_ref();

    let expression: ParserRef = between(open, close, body).to_ref();
    recur.bind(&expression);
    expression
}

/// Evaluate a parsed expression tree down to a number.
pub fn eval(value: &Value) -> Result<i64, String> {
    match value {
        Value::Num(n) => Ok(*n),
        Value::Str(s) => s
            .parse()
            .map_err(|_| format!("not a number: \"{s}\"")),
        Value::List(items) => {
            let [op, lhs, rhs] = items.as_slice() else {
                return Err(format!("expected [op lhs rhs], got {} items", items.len()));
            };
            let op = op
                .as_str()
                .ok_or_else(|| "operator must be a string".to_string())?;
            let lhs = eval(lhs)?;
            let rhs = eval(rhs)?;
            match op {
                "+" => Ok(lhs + rhs),
                "-" => Ok(lhs - rhs),
                "*" => Ok(lhs * rhs),
                "/" if rhs == 0 => Err("division by zero".to_string()),
                "/" => Ok(lhs / rhs),
                "%" if rhs == 0 => Err("modulo by zero".to_string()),
                "%" => Ok(lhs % rhs),
                "pow" => u32::try_from(rhs)
                    .ok()
                    .and_then(|exp| lhs.checked_pow(exp))
                    .ok_or_else(|| format!("pow out of range: {lhs} pow {rhs}")),
                _ => Err(format!("unknown operator \"{op}\"")),
            }
        }
    }
}

/// Parse tree as JSON, for the `--ast` output.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::Num(n) => serde_json::Value::from(*n),
        Value::List(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParseState {
        expression_grammar().run(ParseState::new(source))
    }

    #[test]
    fn test_simple_expression() {
        let state = parse("(+ 1 2)");
        assert!(!state.is_failed());
        assert_eq!(
            state.value(),
            &Value::list([Value::str("+"), Value::str("1"), Value::str("2")])
        );
        assert_eq!(state.offset(), 7);
        assert_eq!(eval(state.value()), Ok(3));
    }

    #[test]
    fn test_nested_expression_with_mixed_brackets() {
        let state = parse("[% (* 2 (- [+ 8 2] (pow 2 2))) 5]");
        assert!(!state.is_failed());
        assert_eq!(eval(state.value()), Ok(2));
    }

    #[test]
    fn test_missing_operand_fails_near_the_gap() {
        let state = parse("(+ 1)");
        assert!(state.is_failed());
        assert_eq!(state.offset(), 4);
        assert_eq!(state.error(), Some("unable to match any input at \")\""));
    }

    #[test]
    fn test_unknown_operator_fails() {
        let state = parse("(? 1 2)");
        assert!(state.is_failed());
    }

    #[test]
    fn test_eval_guards() {
        let div = Value::list([Value::str("/"), Value::str("1"), Value::str("0")]);
        assert_eq!(eval(&div), Err("division by zero".to_string()));
        let pow = Value::list([Value::str("pow"), Value::str("2"), Value::str("99")]);
        assert!(eval(&pow).is_err());
    }

    #[test]
    fn test_to_json() {
        let value = Value::list([Value::str("+"), Value::str("1"), Value::str("2")]);
        assert_eq!(
            to_json(&value).to_string(),
            "[\"+\",\"1\",\"2\"]"
        );
    }
}
