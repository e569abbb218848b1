//! Tokenization for command-block expressions
//!
//! Tokens cover a conventional infix expression grammar. The lexer is
//! deliberately broader than what the evaluator accepts: strings, comparison
//! and bitwise operators all tokenize, so that rejection happens in one place
//! (the allow-list in `eval::expr`) instead of being scattered over the front end.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0, one_of},
    combinator::{map, opt, recognize, value},
    multi::many0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    FloorDiv,   // //
    Percent,    // %
    Power,      // **
    At,         // @
    ShiftLeft,  // <<
    ShiftRight, // >>
    Amp,        // &
    Pipe,       // |
    Caret,      // ^
    Tilde,      // ~
    Lt,         // <
    Gt,         // >
    Le,         // <=
    Ge,         // >=
    Eq,         // ==
    NotEq,      // !=
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Star => "*",
            Operator::Slash => "/",
            Operator::FloorDiv => "//",
            Operator::Percent => "%",
            Operator::Power => "**",
            Operator::At => "@",
            Operator::ShiftLeft => "<<",
            Operator::ShiftRight => ">>",
            Operator::Amp => "&",
            Operator::Pipe => "|",
            Operator::Caret => "^",
            Operator::Tilde => "~",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::Eq => "==",
            Operator::NotEq => "!=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Integer literal: 42
    Int(i64),
    /// Float literal: 1.5, .5, 1., 2e3
    Float(f64),
    /// Identifier or keyword: sqrt, pi, True, not
    Ident(String),
    /// Quoted string: 'abc' or "abc"
    Str(String),
    /// An operator
    Operator(Operator),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Int(n) => write!(f, "{}", n),
            Token::Float(x) => write!(f, "{}", x),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Str(s) => write!(f, "'{}'", s),
            Token::Operator(op) => write!(f, "{}", op.symbol()),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
        }
    }
}

#[derive(Error, Debug)]
pub enum LexError {
    #[error("Unexpected character: {0}")]
    UnexpectedChar(char),
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Exponent suffix: e10, E-3
fn exponent(input: &str) -> IResult<&str, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

/// Parse a numeric literal
fn number(input: &str) -> IResult<&str, Token> {
    let (rest, text) = recognize(pair(
        alt((
            // 1.5 / 1.
            recognize(tuple((digit1, char('.'), digit0))),
            // .5
            recognize(pair(char('.'), digit1)),
            // 15
            digit1,
        )),
        opt(exponent),
    ))(input)?;

    let is_float = text.contains(['.', 'e', 'E']);
    let token = if is_float {
        Token::Float(parse_float(text))
    } else {
        // Literals beyond i64 degrade to floats rather than failing
        match text.parse::<i64>() {
            Ok(n) => Token::Int(n),
            Err(_) => Token::Float(parse_float(text)),
        }
    };
    Ok((rest, token))
}

fn parse_float(text: &str) -> f64 {
    // The recognizer only admits well-formed literals
    text.parse::<f64>().unwrap_or(f64::NAN)
}

/// Parse an identifier: [A-Za-z_][A-Za-z0-9_]*
fn identifier(input: &str) -> IResult<&str, Token> {
    map(
        recognize(pair(
            take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        )),
        |s: &str| Token::Ident(s.to_string()),
    )(input)
}

/// Parse a double-quoted string
fn double_quoted_string(input: &str) -> IResult<&str, Token> {
    map(
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        |s: &str| Token::Str(s.to_string()),
    )(input)
}

/// Parse a single-quoted string
fn single_quoted_string(input: &str) -> IResult<&str, Token> {
    map(
        delimited(char('\''), take_while(|c| c != '\''), char('\'')),
        |s: &str| Token::Str(s.to_string()),
    )(input)
}

/// Parse an operator, multi-char operators first
fn operator(input: &str) -> IResult<&str, Token> {
    map(
        alt((
            alt((
                value(Operator::Power, tag("**")),
                value(Operator::FloorDiv, tag("//")),
                value(Operator::ShiftLeft, tag("<<")),
                value(Operator::ShiftRight, tag(">>")),
                value(Operator::Le, tag("<=")),
                value(Operator::Ge, tag(">=")),
                value(Operator::Eq, tag("==")),
                value(Operator::NotEq, tag("!=")),
            )),
            alt((
                value(Operator::Plus, char('+')),
                value(Operator::Minus, char('-')),
                value(Operator::Star, char('*')),
                value(Operator::Slash, char('/')),
                value(Operator::Percent, char('%')),
                value(Operator::At, char('@')),
                value(Operator::Amp, char('&')),
                value(Operator::Pipe, char('|')),
                value(Operator::Caret, char('^')),
                value(Operator::Tilde, char('~')),
                value(Operator::Lt, char('<')),
                value(Operator::Gt, char('>')),
            )),
        )),
        Token::Operator,
    )(input)
}

/// Parse brackets, commas and the attribute dot
fn punctuation(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::LParen, char('(')),
        value(Token::RParen, char(')')),
        value(Token::LBracket, char('[')),
        value(Token::RBracket, char(']')),
        value(Token::Comma, char(',')),
        value(Token::Dot, char('.')),
    ))(input)
}

/// Parse any single token
fn token(input: &str) -> IResult<&str, Token> {
    preceded(
        multispace0,
        alt((
            // Numbers before the dot, so .5 is a literal
            number,
            identifier,
            double_quoted_string,
            single_quoted_string,
            operator,
            punctuation,
        )),
    )(input)
}

/// Tokenize a complete expression
pub fn lex(input: &str) -> Result<Vec<Token>, LexError> {
    let (remaining, tokens) =
        many0(token)(input).map_err(|e| LexError::ParseError(format!("{:?}", e)))?;

    // Check for any remaining unparsed content
    let remaining = remaining.trim();
    if let Some(c) = remaining.chars().next() {
        return Err(LexError::UnexpectedChar(c));
    }

    log::trace!("lexed {:?} into {} tokens", input, tokens.len());
    Ok(tokens)
}
