//! Placeholder scanner using nom.
//!
//! Splits SQL text into plain text, quoted sections and `@name`
//! placeholders, then rewrites the placeholders for a [`ParamStyle`].
//!
//! ```text
//! UPDATE "t" SET "a" = @a WHERE "note" = '@not_a_param' AND "id" = @id
//!                      ──┬─             ───────┬───────           ─┬─
//!                        │                     │                   └── Placeholder("id")
//!                        │                     └── Quoted (left untouched)
//!                        └── Placeholder("a")
//! ```

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{is_not, tag, take, take_while},
    character::complete::{char, satisfy},
    combinator::{map, recognize},
    multi::many0,
    sequence::{delimited, pair, preceded},
};

use crate::builder::{BoundArgs, BoundQuery, ParamStyle};
use crate::value::{NamedArg, Value};

/// A lexical piece of SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Anything that is not a placeholder, copied verbatim.
    Text(&'a str),
    /// `@name`, holding `name`.
    Placeholder(&'a str),
}

/// Split SQL into text and placeholder tokens.
pub fn tokenize(sql: &str) -> Vec<Token<'_>> {
    match many0(parse_token)(sql) {
        Ok(("", tokens)) => tokens,
        // Every branch consumes at least one char, so leftovers are unexpected.
        _ => vec![Token::Text(sql)],
    }
}

fn parse_token(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        map(single_quoted, Token::Text),
        map(double_quoted, Token::Text),
        map(system_variable, Token::Text),
        map(placeholder, Token::Placeholder),
        map(is_not("'\"@"), Token::Text),
        // Unterminated quote or a lone '@'.
        map(take(1usize), Token::Text),
    ))(input)
}

fn single_quoted(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('\''),
        many0(alt((tag("''"), is_not("'")))),
        char('\''),
    ))(input)
}

fn double_quoted(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('"'),
        many0(alt((tag("\"\""), is_not("\"")))),
        char('"'),
    ))(input)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(is_ident_char),
    ))(input)
}

/// `@@IDENTITY` and friends.
fn system_variable(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("@@"), take_while(is_ident_char)))(input)
}

fn placeholder(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), identifier)(input)
}

fn find_arg<'a>(args: &'a [NamedArg], name: &str) -> Option<&'a NamedArg> {
    args.iter()
        .find(|a| a.name.trim_start_matches('@').eq_ignore_ascii_case(name))
}

fn coerce(value: &Value, coerce_bools: bool) -> Value {
    match value {
        Value::Bool(b) if coerce_bools => Value::Int(i64::from(*b)),
        other => other.clone(),
    }
}

/// Rewrite `@name` placeholders and their arguments for `style`.
///
/// Placeholders without a matching argument are left as they are.
pub fn bind_named_args(sql: &str, args: &[NamedArg], style: ParamStyle) -> BoundQuery {
    match style {
        ParamStyle::Named => BoundQuery {
            sql: sql.to_string(),
            args: BoundArgs::Named(args.to_vec()),
        },
        ParamStyle::Positional { coerce_bools } => {
            let mut out = String::with_capacity(sql.len());
            let mut order: Vec<String> = Vec::new();
            let mut values = Vec::new();

            for token in tokenize(sql) {
                match token {
                    Token::Text(text) => out.push_str(text),
                    Token::Placeholder(name) => match find_arg(args, name) {
                        Some(arg) => {
                            let key = name.to_ascii_lowercase();
                            let index = match order.iter().position(|k| *k == key) {
                                Some(i) => i + 1,
                                None => {
                                    order.push(key);
                                    values.push(coerce(&arg.value, coerce_bools));
                                    order.len()
                                }
                            };
                            out.push('$');
                            out.push_str(&index.to_string());
                        }
                        None => {
                            out.push('@');
                            out.push_str(name);
                        }
                    },
                }
            }

            BoundQuery {
                sql: out,
                args: BoundArgs::Positional(values),
            }
        }
        ParamStyle::Anonymous => {
            let mut out = String::with_capacity(sql.len());
            let mut values = Vec::new();

            for token in tokenize(sql) {
                match token {
                    Token::Text(text) => out.push_str(text),
                    Token::Placeholder(name) => match find_arg(args, name) {
                        Some(arg) => {
                            out.push('?');
                            values.push(arg.value.clone());
                        }
                        None => {
                            out.push('@');
                            out.push_str(name);
                        }
                    },
                }
            }

            BoundQuery {
                sql: out,
                args: BoundArgs::Positional(values),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::named;

    const POSITIONAL: ParamStyle = ParamStyle::Positional {
        coerce_bools: false,
    };

    fn positional(bound: &BoundQuery) -> &[Value] {
        match &bound.args {
            BoundArgs::Positional(v) => v,
            BoundArgs::Named(_) => panic!("expected positional args"),
        }
    }

    #[test]
    fn test_tokenize() {
        let tokens = tokenize("a = @a AND b = 'x@y' AND c = @@ROWCOUNT");
        assert_eq!(
            tokens,
            vec![
                Token::Text("a = "),
                Token::Placeholder("a"),
                Token::Text(" AND b = "),
                Token::Text("'x@y'"),
                Token::Text(" AND c = "),
                Token::Text("@@ROWCOUNT"),
            ]
        );
    }

    #[test]
    fn test_tokenize_escaped_quotes() {
        let tokens = tokenize("'it''s @x' @y");
        assert_eq!(
            tokens,
            vec![
                Token::Text("'it''s @x'"),
                Token::Text(" "),
                Token::Placeholder("y"),
            ]
        );
    }

    #[test]
    fn test_tokenize_unterminated_quote() {
        let tokens = tokenize("'abc @x");
        assert_eq!(tokens.last(), Some(&Token::Placeholder("x")));
    }

    #[test]
    fn test_repeated_name_reuses_index() {
        let bound = bind_named_args(
            "select * from t where a=@x and b=@x",
            &[named("x", 1)],
            POSITIONAL,
        );
        assert_eq!(bound.sql, "select * from t where a=$1 and b=$1");
        assert_eq!(positional(&bound), &[Value::Int(1)]);
    }

    #[test]
    fn test_first_appearance_order_ignores_case() {
        let bound = bind_named_args(
            "x = @B AND y = @a AND z = @b",
            &[named("a", 1), named("b", 2)],
            POSITIONAL,
        );
        assert_eq!(bound.sql, "x = $1 AND y = $2 AND z = $1");
        assert_eq!(positional(&bound), &[Value::Int(2), Value::Int(1)]);
    }

    #[test]
    fn test_bool_coercion() {
        let style = ParamStyle::Positional { coerce_bools: true };
        let bound = bind_named_args(
            "a = @on AND b = @off",
            &[named("on", true), named("off", false)],
            style,
        );
        assert_eq!(positional(&bound), &[Value::Int(1), Value::Int(0)]);

        let kept = bind_named_args("a = @on", &[named("on", true)], POSITIONAL);
        assert_eq!(positional(&kept), &[Value::Bool(true)]);
    }

    #[test]
    fn test_unknown_placeholder_untouched() {
        let bound = bind_named_args("a = @a AND b = @missing", &[named("a", 1)], POSITIONAL);
        assert_eq!(bound.sql, "a = $1 AND b = @missing");
        assert_eq!(positional(&bound).len(), 1);
    }

    #[test]
    fn test_named_pass_through() {
        let args = vec![named("id", 7), named("sku", "Z")];
        let bound = bind_named_args("x = @id", &args, ParamStyle::Named);
        assert_eq!(bound.sql, "x = @id");
        assert_eq!(bound.args, BoundArgs::Named(args));
    }

    #[test]
    fn test_anonymous_repeats_values() {
        let bound = bind_named_args(
            "a = @x AND b = @y AND c = @x",
            &[named("x", 1), named("y", "two")],
            ParamStyle::Anonymous,
        );
        assert_eq!(bound.sql, "a = ? AND b = ? AND c = ?");
        assert_eq!(
            positional(&bound),
            &[Value::Int(1), Value::Text("two".into()), Value::Int(1)]
        );
    }

    #[test]
    fn test_arg_name_with_at_prefix() {
        let bound = bind_named_args("a = @x", &[named("@x", 5)], POSITIONAL);
        assert_eq!(bound.sql, "a = $1");
    }
}
