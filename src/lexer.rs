use miette::{Diagnostic, SourceSpan};
use thiserror::Error;
use tracing::{debug, trace};

use crate::number::Number;

#[derive(Diagnostic, Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("empty expression")]
    #[diagnostic(code(rpn::lex::empty_expression), help("try an expression such as `3 4 +`"))]
    EmptyExpression,

    #[error("unbalanced brackets")]
    #[diagnostic(code(rpn::lex::unbalanced_brackets))]
    UnbalancedBrackets {
        #[label("this bracket has no partner")]
        span: SourceSpan,
    },

    #[error("expression contains no tokens")]
    #[diagnostic(code(rpn::lex::no_tokens))]
    NoTokens,

    #[error("invalid number: {text}")]
    #[diagnostic(code(rpn::lex::invalid_number))]
    InvalidNumber {
        text: String,
        #[label("this numeric literal")]
        span: SourceSpan,
    },

    #[error("unknown symbol: {symbol}")]
    #[diagnostic(code(rpn::lex::unknown_symbol))]
    UnknownSymbol {
        symbol: char,
        #[label("this input character")]
        span: SourceSpan,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    FloorDiv,
    Mod,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "**",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `$`
    Plus,
    /// `~`
    Negate,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "$",
            UnaryOp::Negate => "~",
        }
    }
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Either kind of operator, for errors that can come from both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Binary(BinaryOp),
    Unary(UnaryOp),
}

impl From<BinaryOp> for Operator {
    fn from(op: BinaryOp) -> Self {
        Operator::Binary(op)
    }
}

impl From<UnaryOp> for Operator {
    fn from(op: UnaryOp) -> Self {
        Operator::Unary(op)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Binary(op) => op.fmt(f),
            Operator::Unary(op) => op.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    LeftParen,
    RightParen,
    Number(Number),
    Binary(BinaryOp),
    Unary(UnaryOp),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a> {
    pub slice: &'a str,
    pub offset: usize,
    pub kind: TokenKind,
}

impl Token<'_> {
    pub fn span(&self) -> SourceSpan {
        (self.offset, self.slice.len()).into()
    }
}

impl<'a> std::fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slice)
    }
}

/// Splits an expression into tokens one at a time.
///
/// A `+` or `-` directly followed by a digit or `.` is read as the sign of a
/// literal only at the start of the input or after `(` or an operator. After a
/// number or `)` it is always an operator, so `5-3` and `5 ~-3 +` both lex as
/// expected without spaces.
///
/// The lexer does not check bracket balance; use [`tokenize`] for that.
#[derive(Debug)]
pub struct Lexer<'a> {
    source: &'a str,
    rest: &'a str,
    byte: usize,
    last: Option<TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            source: input,
            rest: input,
            byte: 0,
            last: None,
        }
    }

    fn at_number_start(&self) -> bool {
        matches!(
            self.last,
            None | Some(TokenKind::LeftParen | TokenKind::Binary(_) | TokenKind::Unary(_))
        )
    }

    fn emit(&mut self, offset: usize, kind: TokenKind) -> Token<'a> {
        self.last = Some(kind);
        Token {
            slice: &self.source[offset..self.byte],
            offset,
            kind,
        }
    }

    /// Scans digits, then an optional `.` and more digits, starting at `body`.
    /// `offset` is where the literal began, which is before `body` when it carries a sign.
    fn number(&mut self, offset: usize, body: usize) -> Result<Token<'a>, LexError> {
        let bytes = self.source.as_bytes();
        let mut end = body;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end < bytes.len() && bytes[end] == b'.' {
            end += 1;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
        }

        self.byte = end;
        self.rest = &self.source[end..];

        let literal = &self.source[offset..end];
        let value = literal
            .parse::<Number>()
            .map_err(|_| LexError::InvalidNumber {
                text: literal.to_string(),
                span: (offset, literal.len()).into(),
            })?;

        Ok(self.emit(offset, TokenKind::Number(value)))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            let offset = self.byte;
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            enum Started {
                Number,
                SignOrOperator(BinaryOp),
                IfDoubledElse(char, BinaryOp, BinaryOp),
            }

            let started = match c {
                c if c.is_whitespace() => continue,
                '(' => return Some(Ok(self.emit(offset, TokenKind::LeftParen))),
                ')' => return Some(Ok(self.emit(offset, TokenKind::RightParen))),
                '~' => return Some(Ok(self.emit(offset, TokenKind::Unary(UnaryOp::Negate)))),
                '$' => return Some(Ok(self.emit(offset, TokenKind::Unary(UnaryOp::Plus)))),
                '*' => Started::IfDoubledElse('*', BinaryOp::Pow, BinaryOp::Mul),
                '/' => Started::IfDoubledElse('/', BinaryOp::FloorDiv, BinaryOp::Div),
                '+' => Started::SignOrOperator(BinaryOp::Add),
                '-' => Started::SignOrOperator(BinaryOp::Sub),
                '%' => return Some(Ok(self.emit(offset, TokenKind::Binary(BinaryOp::Mod)))),
                '0'..='9' | '.' => Started::Number,
                _ => {
                    return Some(Err(LexError::UnknownSymbol {
                        symbol: c,
                        span: (offset, c.len_utf8()).into(),
                    }))
                }
            };

            return Some(match started {
                Started::Number => self.number(offset, offset),
                Started::SignOrOperator(op) => {
                    let next_is_numeric = self
                        .rest
                        .starts_with(|c: char| c.is_ascii_digit() || c == '.');
                    if next_is_numeric && self.at_number_start() {
                        self.number(offset, self.byte)
                    } else {
                        Ok(self.emit(offset, TokenKind::Binary(op)))
                    }
                }
                Started::IfDoubledElse(second, yes, no) => {
                    if self.rest.starts_with(second) {
                        self.rest = &self.rest[second.len_utf8()..];
                        self.byte += second.len_utf8();
                        Ok(self.emit(offset, TokenKind::Binary(yes)))
                    } else {
                        Ok(self.emit(offset, TokenKind::Binary(no)))
                    }
                }
            });
        }
    }
}

/// Checks that every `)` closes an earlier `(` and every `(` is closed.
pub fn check_brackets(input: &str) -> Result<(), LexError> {
    let mut open = Vec::new();
    for (offset, c) in input.char_indices() {
        match c {
            '(' => open.push(offset),
            ')' => {
                if open.pop().is_none() {
                    return Err(LexError::UnbalancedBrackets {
                        span: (offset, 1).into(),
                    });
                }
            }
            _ => {}
        }
    }

    match open.first() {
        Some(&offset) => Err(LexError::UnbalancedBrackets {
            span: (offset, 1).into(),
        }),
        None => Ok(()),
    }
}

/// Turns a whole expression into tokens, rejecting empty input and unbalanced brackets
/// before scanning.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    if input.trim().is_empty() {
        return Err(LexError::EmptyExpression);
    }
    check_brackets(input)?;

    let tokens = Lexer::new(input).collect::<Result<Vec<_>, _>>()?;
    if tokens.is_empty() {
        return Err(LexError::NoTokens);
    }

    debug!(count = tokens.len(), "tokenized expression");
    trace!(?tokens);
    Ok(tokens)
}
