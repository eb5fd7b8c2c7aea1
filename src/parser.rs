// ABOUTME: Parser module, producing Pair/Nil expression trees from source text

use nom::{
    branch::alt,
    bytes::complete::{escaped, tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1, none_of, one_of},
    combinator::{not, opt, peek, recognize, value},
    multi::many0,
    IResult, Parser,
};

use crate::value::Value;

/// Skip whitespace and `;`-style comments.
fn ws_and_comments(input: &str) -> IResult<&str, ()> {
    many0(alt((value((), multispace1), parse_comment))).map(|_| ()).parse(input)
}

fn parse_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = char(';')(input)?;
    let (input, _) = take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

/// Integer literals parse to `Value::Integer`; anything with a decimal point
/// parses to `Value::Real`.
fn parse_number(input: &str) -> IResult<&str, Value> {
    let (input, text) = recognize((
        opt(char('-')),
        alt((
            recognize((digit1, opt((char('.'), opt(digit1))))),
            recognize((char('.'), digit1)),
        )),
    ))
    .parse(input)?;

    let value = if text.contains('.') {
        Value::Real(text.parse().expect("validated by the recognizer above"))
    } else {
        Value::Integer(text.parse().expect("validated by the recognizer above"))
    };
    Ok((input, value))
}

fn parse_bool(input: &str) -> IResult<&str, Value> {
    alt((value(Value::Bool(true), tag("#t")), value(Value::Bool(false), tag("#f")))).parse(input)
}

const SYMBOL_LEAD: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ+-*/%<>=!?";
const SYMBOL_REST: fn(char) -> bool = |c: char| {
    c.is_alphanumeric() || "-_?!<>=+*/%".contains(c)
};

fn parse_symbol(input: &str) -> IResult<&str, Value> {
    let (input, first) = one_of(SYMBOL_LEAD)(input)?;
    let (input, rest) = take_while1::<_, _, nom::error::Error<_>>(SYMBOL_REST)(input).unwrap_or((input, ""));

    let mut symbol = String::new();
    symbol.push(first);
    symbol.push_str(rest);
    Ok((input, Value::symbol(symbol)))
}

fn parse_string(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('"')(input)?;
    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('"')(input) {
        return Ok((input, Value::string("")));
    }

    let (input, content) = escaped(none_of("\"\\"), '\\', one_of("\"\\nt"))(input)?;
    let (input, _) = char('"')(input)?;

    let mut result = String::new();
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => {}
            }
        } else {
            result.push(c);
        }
    }
    Ok((input, Value::string(result)))
}

fn wrap(tag_name: &str, expr: Value) -> Value {
    Value::list_from_vec(vec![Value::symbol(tag_name), expr])
}

fn parse_quote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('\'')(input)?;
    let (input, expr) = parse_expr(input)?;
    Ok((input, wrap("quote", expr)))
}

fn parse_quasiquote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('`')(input)?;
    let (input, expr) = parse_expr(input)?;
    Ok((input, wrap("quasiquote", expr)))
}

fn parse_unquote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char(',')(input)?;
    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('@')(input) {
        let (input, expr) = parse_expr(input)?;
        return Ok((input, wrap("unquote-splicing", expr)));
    }
    let (input, expr) = parse_expr(input)?;
    Ok((input, wrap("unquote", expr)))
}

/// `()` parses to `Value::Nil`; a non-empty list parses to a proper Pair
/// chain, since the core only ever sees Pair/Nil composites.
fn parse_list(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('(')(input)?;
    let (mut remaining, _) = ws_and_comments(input)?;

    let mut items = Vec::new();
    loop {
        if let Ok((rest, _)) = char::<_, nom::error::Error<_>>(')')(remaining) {
            return Ok((rest, Value::list_from_vec(items)));
        }
        let (rest, expr) = parse_expr(remaining)?;
        items.push(expr);
        let (rest, _) = ws_and_comments(rest)?;
        remaining = rest;
    }
}

fn parse_expr(input: &str) -> IResult<&str, Value> {
    let (input, _) = ws_and_comments(input)?;
    alt((
        parse_quote,
        parse_quasiquote,
        parse_unquote,
        parse_list,
        parse_bool,
        parse_number,
        parse_string,
        parse_symbol,
    ))
    .parse(input)
}

/// Parses one expression, returning the expression and the unconsumed tail.
pub fn parse_one(input: &str) -> Result<(Value, &str), String> {
    parse_expr(input).map(|(rest, value)| (value, rest)).map_err(|e| format!("parse error: {e:?}"))
}

/// Parses every top-level expression in `source`.
pub fn parse_all(source: &str) -> Result<Vec<Value>, String> {
    let mut remaining = source;
    let mut exprs = Vec::new();
    loop {
        let (rest, _) = ws_and_comments(remaining).unwrap_or((remaining, ()));
        if rest.trim().is_empty() {
            return Ok(exprs);
        }
        let (value, rest) = parse_one(rest)?;
        exprs.push(value);
        remaining = rest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integers_and_reals_distinctly() {
        assert!(matches!(parse_one("42").unwrap().0, Value::Integer(42)));
        assert!(matches!(parse_one("-2.5").unwrap().0, Value::Real(r) if (r + 2.5).abs() < 1e-9));
    }

    #[test]
    fn parses_booleans_and_symbols() {
        assert!(matches!(parse_one("#t").unwrap().0, Value::Bool(true)));
        assert!(matches!(parse_one("foo?").unwrap().0, Value::Symbol(_)));
    }

    #[test]
    fn parses_strings_with_escapes() {
        let (value, _) = parse_one(r#""say \"hi\"""#).unwrap();
        assert_eq!(value.to_string(), "\"say \"hi\"\"");
    }

    #[test]
    fn empty_list_is_nil() {
        assert!(matches!(parse_one("()").unwrap().0, Value::Nil));
    }

    #[test]
    fn nested_lists_build_pair_chains() {
        let (value, _) = parse_one("(1 (2 3) 4)").unwrap();
        let items = value.list_to_vec().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].list_to_vec().unwrap().len(), 2);
    }

    #[test]
    fn quote_family_desugars_to_special_forms() {
        let (q, _) = parse_one("'x").unwrap();
        assert_eq!(q.list_to_vec().unwrap().len(), 2);

        let (qq, _) = parse_one("`(1 ,x ,@y)").unwrap();
        let outer = qq.list_to_vec().unwrap();
        assert!(matches!(&outer[0], Value::Symbol(s) if &**s == "quasiquote"));
        let inner = outer[1].list_to_vec().unwrap();
        assert_eq!(inner.len(), 3);
        assert!(matches!(&inner[1].list_to_vec().unwrap()[0], Value::Symbol(s) if &**s == "unquote"));
    }

    #[test]
    fn parse_all_reads_multiple_top_level_expressions() {
        let exprs = parse_all("1 2 3").unwrap();
        assert_eq!(exprs.len(), 3);
    }
}
