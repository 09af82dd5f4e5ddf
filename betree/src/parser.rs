//! Parser for the infix expression language using chumsky.
//!
//! Two stages:
//! 1) Tokenisation from input string to a spanned `Token` stream.
//! 2) Parsing tokens into a small owned AST, then lowering it to a [`LogicalNode`].
//!
//! The accepted syntax round-trips with the pretty-printer in `node::pretty`:
//! - Comparisons: `key OP literal` with `OP` one of `==`, `!=`, `<`, `>`.
//! - Keys: `[A-Za-z_][A-Za-z0-9_.]*`.
//! - Literals: decimal 64-bit integers (optionally negative) and double-quoted
//!   strings with `\"`, `\\`, `\n` and `\t` escapes.
//! - Logic: `!P`, `P && Q`, `P || Q`, with `!` binding tightest and `||` loosest.
//!   Both binary operators are left-associative.
//! - Parentheses can wrap any full expression.
//!
//! An identifier on the right-hand side of a comparison is syntactically
//! accepted but rejected while lowering, with [`Error::UnsupportedOperand`].
use chumsky::{input::ValueInput, prelude::*};

use crate::{
    node::{self, Comparison, ComparisonOp, LogicalNode},
    utils::error::{BetResult, Error, ParserError},
    value::AttributeValue,
};

pub type Spanned<T> = (T, SimpleSpan);
type Span = SimpleSpan;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Token {
    // Delimiters
    LParen,
    RParen,

    // Operators
    And,   // &&
    Or,    // ||
    Not,   // !
    Eq,    // ==
    NotEq, // !=
    Lt,    // <
    Gt,    // >

    // Atoms
    Ident(String),
    Int(i64),
    Str(String),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::And => write!(f, "&&"),
            Token::Or => write!(f, "||"),
            Token::Not => write!(f, "!"),
            Token::Eq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Ident(name) => write!(f, "{name}"),
            Token::Int(v) => write!(f, "{v}"),
            Token::Str(s) => write!(f, "{}", AttributeValue::Text(s.clone())),
        }
    }
}

// ---------------- Lexer ----------------

fn lexer<'src>() -> impl Parser<'src, &'src str, Vec<Spanned<Token>>, extra::Err<Rich<'src, char>>>
{
    // Two-character operators first so that `!=` is not read as `!` then `=`
    let op = choice((
        just("&&").to(Token::And),
        just("||").to(Token::Or),
        just("==").to(Token::Eq),
        just("!=").to(Token::NotEq),
        just('!').to(Token::Not),
        just('<').to(Token::Lt),
        just('>').to(Token::Gt),
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
    ));

    let int = just('-')
        .or_not()
        .then(text::digits(10))
        .to_slice()
        .try_map(|s: &str, span| {
            s.parse::<i64>().map(Token::Int).map_err(|_| {
                Rich::custom(
                    span,
                    format!("integer literal {s} does not fit in a signed 64-bit integer"),
                )
            })
        })
        .labelled("integer");

    let escape = just('\\')
        .ignore_then(choice((
            just('\\'),
            just('"'),
            just('n').to('\n'),
            just('t').to('\t'),
        )))
        .labelled("escape sequence");

    let string = none_of("\\\"")
        .or(escape)
        .repeated()
        .collect::<String>()
        .delimited_by(just('"'), just('"'))
        .map(Token::Str)
        .labelled("string");

    let ident = any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
                .repeated(),
        )
        .to_slice()
        .map(|s: &str| Token::Ident(s.to_string()))
        .labelled("identifier");

    choice((op, int, string, ident))
        .map_with(|tok, e| (tok, e.span()))
        .padded()
        .repeated()
        .collect::<Vec<_>>()
        .padded()
        .then_ignore(end())
}

// ---------------- AST ----------------

#[derive(Debug, Clone)]
enum Operand {
    Literal(AttributeValue),
    Ident(String),
}

#[derive(Debug, Clone)]
enum Ast {
    And(Box<Ast>, Box<Ast>),
    Or(Box<Ast>, Box<Ast>),
    Not(Box<Ast>),
    Comparison {
        key: String,
        op: ComparisonOp,
        operand: Operand,
        span: Span,
    },
}

impl Ast {
    /// Lowers to a [`LogicalNode`], reporting the leftmost unsupported operand.
    fn lower(self) -> BetResult<LogicalNode> {
        Ok(match self {
            Ast::And(left, right) => node::and(left.lower()?, right.lower()?),
            Ast::Or(left, right) => node::or(left.lower()?, right.lower()?),
            Ast::Not(inner) => node::not(inner.lower()?),
            Ast::Comparison {
                key,
                op,
                operand: Operand::Literal(value),
                ..
            } => Comparison::new(op, key, value).into(),
            Ast::Comparison {
                operand: Operand::Ident(found),
                span,
                ..
            } => {
                return Err(Error::UnsupportedOperand {
                    found,
                    start: span.start,
                    end: span.end,
                });
            }
        })
    }
}

// ---------------- chumsky parser over tokens ----------------

fn ast_parser<'tokens, I>()
-> impl Parser<'tokens, I, Ast, extra::Err<Rich<'tokens, Token, Span>>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = Span>,
{
    recursive(|expr| {
        let key = select! { Token::Ident(name) => name }.labelled("attribute name");

        let op = select! {
            Token::Eq => ComparisonOp::Eq,
            Token::NotEq => ComparisonOp::NotEq,
            Token::Lt => ComparisonOp::Lt,
            Token::Gt => ComparisonOp::Gt,
        }
        .labelled("comparison operator");

        let operand = select! {
            Token::Int(v) => Operand::Literal(AttributeValue::Integer(v)),
            Token::Str(s) => Operand::Literal(AttributeValue::Text(s)),
            Token::Ident(name) => Operand::Ident(name),
        }
        .map_with(|operand, e| (operand, e.span()))
        .labelled("literal");

        let comparison = key
            .then(op)
            .then(operand)
            .map(|((key, op), (operand, span))| Ast::Comparison {
                key,
                op,
                operand,
                span,
            })
            .labelled("comparison");

        let atom = expr
            .delimited_by(just(Token::LParen), just(Token::RParen))
            .or(comparison)
            .labelled("atom");

        // Prefix not binds tightest
        let unary = just(Token::Not)
            .repeated()
            .foldr(atom, |_, rhs| Ast::Not(Box::new(rhs)));

        // && binds tighter than ||, both left-assoc
        let conjunction = unary.clone().foldl(
            just(Token::And).ignore_then(unary).repeated(),
            |a, b| Ast::And(Box::new(a), Box::new(b)),
        );

        conjunction
            .clone()
            .foldl(
                just(Token::Or).ignore_then(conjunction).repeated(),
                |a, b| Ast::Or(Box::new(a), Box::new(b)),
            )
            .labelled("expression")
    })
}

// ---------------- Public API ----------------

fn parser_error<T: std::fmt::Display>(error: &Rich<'_, T, Span>) -> ParserError {
    ParserError {
        message: error.reason().to_string(),
        start: error.span().start,
        end: error.span().end,
    }
}

/// Parse an infix expression into a [`LogicalNode`].
///
/// Lexing and parsing faults are collected into [`Error::ParserErrors`], with
/// byte spans into `src`. A comparison against another attribute yields
/// [`Error::UnsupportedOperand`].
///
/// Example
/// ```
/// use betree::parser::parse;
/// use betree::node::{and, eq, not, gt};
/// let tree = parse(r#"val1 == "1" && !(val2 > 10)"#).unwrap();
/// assert_eq!(tree, and(eq("val1", "1"), not(gt("val2", 10))));
/// ```
pub fn parse(src: &str) -> BetResult<LogicalNode> {
    // 1) Lexing
    let (tokens, lex_errs) = lexer().parse(src).into_output_errors();
    let mut errors: Vec<ParserError> = lex_errs.iter().map(parser_error).collect();

    let tokens = match tokens {
        Some(toks) if errors.is_empty() => toks,
        _ => return Err(Error::ParserErrors { errors }),
    };

    // 2) Parsing over the spanned token stream, so that errors carry byte offsets
    let eoi: Span = (src.len()..src.len()).into();
    let (ast, parse_errs) = ast_parser()
        .then_ignore(end())
        .parse(tokens.as_slice().map(eoi, |(t, s)| (t, s)))
        .into_output_errors();
    errors.extend(parse_errs.iter().map(parser_error));

    match ast {
        Some(ast) if errors.is_empty() => ast.lower(),
        _ => Err(Error::ParserErrors { errors }),
    }
}
