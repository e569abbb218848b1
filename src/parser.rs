//! Parser for command-block expressions
//!
//! Recursive descent over the token stream with conventional precedence:
//!
//! ```text
//! tuple      a, b
//! or / and / not
//! comparison < > <= >= == !=
//! | ^ &      bitwise
//! << >>      shifts
//! + -
//! * / // % @
//! + - ~      unary
//! **         right-assoc, binds tighter than a unary on its left
//! postfix    f(x)  a.b  a[i]
//! atom       literal, name, ( ... )
//! ```
//!
//! The parser accepts the whole grammar; deciding what may run is left to
//! the evaluator's allow-list.

use crate::ast::{BinaryOp, BoolOp, CompareOp, Expr, Number, UnaryOp};
use crate::lexer::{Operator, Token};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected token '{0}'")]
    UnexpectedToken(Token),
    #[error("unmatched '('")]
    UnmatchedParen,
    #[error("unmatched '['")]
    UnmatchedBracket,
    #[error("empty input")]
    EmptyInput,
    #[error("expression too deeply nested")]
    TooDeep,
}

/// Words that can never stand as a bare name
const RESERVED: &[&str] = &[
    "and", "or", "not", "import", "from", "lambda", "if", "else", "for", "in", "is", "def",
    "class", "return", "yield", "await", "while", "del", "global", "pass", "with", "as",
];

/// Deepest expression tree the parser will build
const MAX_DEPTH: usize = 1000;

/// Deepest nesting of parentheses, brackets and call arguments
const MAX_NESTING: usize = 100;

/// Parser state
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Depth of the tree built so far along the current path
    depth: usize,
    /// Open brackets along the current path
    nesting: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0, depth: 0, nesting: 0 }
    }

    /// Account for `levels` more tree levels below the current node
    fn descend(&mut self, levels: usize) -> Result<(), ParseError> {
        self.depth += levels;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep);
        }
        Ok(())
    }

    fn ascend(&mut self, levels: usize) {
        self.depth -= levels;
    }

    fn open_bracket(&mut self) -> Result<(), ParseError> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(ParseError::TooDeep);
        }
        self.descend(1)
    }

    fn close_bracket(&mut self) {
        self.nesting -= 1;
        self.ascend(1);
    }

    /// Peek at the current token without consuming it
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Consume and return the current token
    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Check if we're at the end of input
    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Consume the current token if it equals `expected`
    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        match self.peek() {
            Some(Token::Ident(s)) if s == word => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn peek_operator(&self) -> Option<Operator> {
        match self.peek() {
            Some(Token::Operator(op)) => Some(*op),
            _ => None,
        }
    }

    /// Parse the entire input into a single expression
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        if self.is_at_end() {
            return Err(ParseError::EmptyInput);
        }

        let expr = self.parse_tuple()?;

        match self.advance() {
            None => Ok(expr),
            Some(Token::RParen) => Err(ParseError::UnmatchedParen),
            Some(token) => Err(ParseError::UnexpectedToken(token)),
        }
    }

    /// a, b, c
    fn parse_tuple(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_or()?;
        if self.peek() != Some(&Token::Comma) {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if self.starts_operand() {
                items.push(self.parse_or()?);
            } else {
                break; // trailing comma
            }
        }
        Ok(Expr::Tuple(items))
    }

    /// Whether the next token can begin an operand
    fn starts_operand(&self) -> bool {
        match self.peek() {
            Some(Token::Int(_) | Token::Float(_) | Token::Str(_) | Token::LParen) => true,
            Some(Token::Ident(s)) => s == "not" || !RESERVED.contains(&s.as_str()),
            Some(Token::Operator(Operator::Plus | Operator::Minus | Operator::Tilde)) => true,
            _ => false,
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_and()?;
        let mut values = vec![first];
        while self.eat_keyword("or") {
            values.push(self.parse_and()?);
        }
        Ok(fold_bool(BoolOp::Or, values))
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_not()?;
        let mut values = vec![first];
        while self.eat_keyword("and") {
            values.push(self.parse_not()?);
        }
        Ok(fold_bool(BoolOp::And, values))
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.eat_keyword("not") {
            self.descend(1)?;
            let operand = self.parse_not()?;
            self.ascend(1);
            return Ok(Expr::Unary { op: UnaryOp::Not, operand: Box::new(operand) });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_bit_or()?;
        let mut ops = Vec::new();
        loop {
            let op = match self.peek_operator() {
                Some(Operator::Lt) => CompareOp::Lt,
                Some(Operator::Gt) => CompareOp::Gt,
                Some(Operator::Le) => CompareOp::Le,
                Some(Operator::Ge) => CompareOp::Ge,
                Some(Operator::Eq) => CompareOp::Eq,
                Some(Operator::NotEq) => CompareOp::NotEq,
                _ => break,
            };
            self.advance();
            ops.push((op, self.parse_bit_or()?));
        }

        if ops.is_empty() {
            Ok(left)
        } else {
            Ok(Expr::Compare { left: Box::new(left), ops })
        }
    }

    fn parse_bit_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&[(Operator::Pipe, BinaryOp::BitOr)], Self::parse_bit_xor)
    }

    fn parse_bit_xor(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&[(Operator::Caret, BinaryOp::BitXor)], Self::parse_bit_and)
    }

    fn parse_bit_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&[(Operator::Amp, BinaryOp::BitAnd)], Self::parse_shift)
    }

    fn parse_shift(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            &[
                (Operator::ShiftLeft, BinaryOp::LShift),
                (Operator::ShiftRight, BinaryOp::RShift),
            ],
            Self::parse_arith,
        )
    }

    fn parse_arith(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            &[(Operator::Plus, BinaryOp::Add), (Operator::Minus, BinaryOp::Sub)],
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            &[
                (Operator::Star, BinaryOp::Mul),
                (Operator::Slash, BinaryOp::Div),
                (Operator::FloorDiv, BinaryOp::FloorDiv),
                (Operator::Percent, BinaryOp::Mod),
                (Operator::At, BinaryOp::MatMul),
            ],
            Self::parse_factor,
        )
    }

    /// One left-associative precedence level
    fn parse_binary_level(
        &mut self,
        table: &[(Operator, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let mut left = next(self)?;
        let mut folds = 0;
        while let Some(op) = self.peek_operator() {
            let Some((_, bin)) = table.iter().find(|(tok, _)| *tok == op) else {
                break;
            };
            self.advance();
            // every fold pushes the left operand one level down
            self.descend(1)?;
            folds += 1;
            let right = next(self)?;
            left = Expr::Binary { op: *bin, left: Box::new(left), right: Box::new(right) };
        }
        self.ascend(folds);
        Ok(left)
    }

    /// Unary prefix: + - ~
    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek_operator() {
            Some(Operator::Plus) => UnaryOp::Plus,
            Some(Operator::Minus) => UnaryOp::Minus,
            Some(Operator::Tilde) => UnaryOp::Invert,
            _ => return self.parse_power(),
        };
        self.advance();
        self.descend(1)?;
        let operand = self.parse_factor()?;
        self.ascend(1);
        Ok(Expr::Unary { op, operand: Box::new(operand) })
    }

    /// base ** exponent, where the exponent may itself carry a unary sign
    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_postfix()?;
        if self.peek_operator() == Some(Operator::Power) {
            self.advance();
            self.descend(1)?;
            let exponent = self.parse_factor()?;
            self.ascend(1);
            return Ok(Expr::Binary {
                op: BinaryOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    /// Calls, attribute access and subscripts
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_atom()?;
        let mut links = 0;
        loop {
            match self.peek() {
                Some(Token::LParen) => {
                    self.advance();
                    self.descend(1)?;
                    links += 1;
                    self.open_bracket()?;
                    let args = self.parse_arguments()?;
                    self.close_bracket();
                    expr = Expr::Call { func: Box::new(expr), args };
                }
                Some(Token::Dot) => {
                    self.advance();
                    self.descend(1)?;
                    links += 1;
                    match self.advance() {
                        Some(Token::Ident(attr)) => {
                            expr = Expr::Attribute { value: Box::new(expr), attr };
                        }
                        Some(token) => return Err(ParseError::UnexpectedToken(token)),
                        None => return Err(ParseError::UnexpectedEof),
                    }
                }
                Some(Token::LBracket) => {
                    self.advance();
                    self.descend(1)?;
                    links += 1;
                    self.open_bracket()?;
                    let index = self.parse_tuple()?;
                    self.close_bracket();
                    match self.advance() {
                        Some(Token::RBracket) => {}
                        Some(token) => return Err(ParseError::UnexpectedToken(token)),
                        None => return Err(ParseError::UnmatchedBracket),
                    }
                    expr = Expr::Subscript { value: Box::new(expr), index: Box::new(index) };
                }
                _ => break,
            }
        }
        self.ascend(links);
        Ok(expr)
    }

    /// Argument list after the opening parenthesis has been consumed
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        loop {
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
            if self.is_at_end() {
                return Err(ParseError::UnmatchedParen);
            }
            args.push(self.parse_or()?);
            match self.advance() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(args),
                Some(token) => return Err(ParseError::UnexpectedToken(token)),
                None => return Err(ParseError::UnmatchedParen),
            }
        }
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance().ok_or(ParseError::UnexpectedEof)?;

        match token {
            Token::Int(n) => Ok(Expr::Num(Number::Int(n))),
            Token::Float(f) => Ok(Expr::Num(Number::Float(f))),
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::Ident(name) => {
                if RESERVED.contains(&name.as_str()) {
                    return Err(ParseError::UnexpectedToken(Token::Ident(name)));
                }
                Ok(match name.as_str() {
                    "True" => Expr::Bool(true),
                    "False" => Expr::Bool(false),
                    "None" => Expr::NoneLit,
                    _ => Expr::Name(name),
                })
            }
            Token::LParen => self.parse_group(),
            other => Err(ParseError::UnexpectedToken(other)),
        }
    }

    /// Parenthesized expression, the opening parenthesis already consumed
    fn parse_group(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Token::RParen) {
            return Ok(Expr::Tuple(Vec::new()));
        }
        self.open_bracket()?;
        let inner = self.parse_tuple()?;
        self.close_bracket();
        match self.advance() {
            Some(Token::RParen) => Ok(inner),
            Some(token) => Err(ParseError::UnexpectedToken(token)),
            None => Err(ParseError::UnmatchedParen),
        }
    }
}

fn fold_bool(op: BoolOp, mut values: Vec<Expr>) -> Expr {
    if values.len() == 1 {
        values.remove(0)
    } else {
        Expr::BoolOp { op, values }
    }
}

/// Parse tokens into an expression tree
pub fn parse(tokens: Vec<Token>) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(tokens);
    parser.parse()
}
