//! Bytecode compiler: a Pratt parser that emits instructions directly.
//!
//! There is no AST. The compiler holds one token of lookahead, pulls
//! tokens off the scanner as needed, and writes opcodes and constants into
//! a chunk as each handler fires.

use crate::bytecode::chunk::{Chunk, MAX_CONSTANTS};
use crate::bytecode::instruction::OpCode;
use crate::bytecode::value::Value;
use crate::error::CompileError;
use crate::lexer::{Scanner, Token, TokenKind};

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Operator precedence levels (higher = tighter binding).
///
/// The grammar currently reaches Equality through Unary; the remaining
/// levels are reserved for grammar that does not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    None = 0,
    Assignment = 1, // =
    Or = 2,         // or
    And = 3,        // and
    Equality = 4,   // ==
    Comparison = 5, // < >
    Term = 6,       // + -
    Factor = 7,     // * /
    Unary = 8,      // ! -
    Call = 9,       // . ()
    Primary = 10,
}

impl Precedence {
    /// The next-tighter level; infix handlers parse their right operand
    /// here so that equal-precedence operators associate left.
    pub fn next(self) -> Precedence {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Call,
            Precedence::Call => Precedence::Primary,
            Precedence::Primary => Precedence::Primary,
        }
    }
}

/// Handler selectors for the rule table; dispatched through a match on the
/// compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseFn {
    Literal,
    Number,
    Grouping,
    Unary,
    Binary,
}

/// One row of the Pratt rule table.
#[derive(Debug, Clone, Copy)]
struct ParseRule {
    prefix: Option<ParseFn>,
    infix: Option<ParseFn>,
    precedence: Precedence,
}

impl ParseRule {
    const fn new(prefix: Option<ParseFn>, infix: Option<ParseFn>, precedence: Precedence) -> Self {
        Self {
            prefix,
            infix,
            precedence,
        }
    }
}

/// Rule lookup for a token kind. Kinds with no entry cannot appear inside
/// an expression at all; `!=`, `<=` and `>=` are tokenized but have no row
/// here, so using them fails with an unknown-token-type error. `+`, `*`
/// and `/` keep their prefix slots even though no unary instruction backs
/// them.
fn parse_rule(kind: TokenKind) -> Option<ParseRule> {
    match kind {
        TokenKind::Eof => Some(ParseRule::new(None, None, Precedence::None)),
        TokenKind::Nil | TokenKind::False | TokenKind::True => {
            Some(ParseRule::new(Some(ParseFn::Literal), None, Precedence::None))
        }
        TokenKind::LeftParen => {
            Some(ParseRule::new(Some(ParseFn::Grouping), None, Precedence::None))
        }
        TokenKind::RightParen => Some(ParseRule::new(None, None, Precedence::None)),
        TokenKind::Plus | TokenKind::Minus => Some(ParseRule::new(
            Some(ParseFn::Unary),
            Some(ParseFn::Binary),
            Precedence::Term,
        )),
        TokenKind::Star | TokenKind::Slash => Some(ParseRule::new(
            Some(ParseFn::Unary),
            Some(ParseFn::Binary),
            Precedence::Factor,
        )),
        TokenKind::EqualEqual => Some(ParseRule::new(
            None,
            Some(ParseFn::Binary),
            Precedence::Equality,
        )),
        TokenKind::Greater | TokenKind::Less => Some(ParseRule::new(
            None,
            Some(ParseFn::Binary),
            Precedence::Comparison,
        )),
        TokenKind::Bang => Some(ParseRule::new(Some(ParseFn::Unary), None, Precedence::None)),
        TokenKind::Number => Some(ParseRule::new(Some(ParseFn::Number), None, Precedence::None)),
        _ => None,
    }
}

/// Constant-free literal instructions.
fn literal_op(kind: TokenKind) -> Option<OpCode> {
    match kind {
        TokenKind::Nil => Some(OpCode::Nil),
        TokenKind::False => Some(OpCode::False),
        TokenKind::True => Some(OpCode::True),
        _ => None,
    }
}

/// Prefix operators with an instruction behind them. `+`, `*` and `/` are
/// absent: their prefix handler parses an operand and then fails here.
fn unary_op(kind: TokenKind) -> Option<OpCode> {
    match kind {
        TokenKind::Minus => Some(OpCode::Negate),
        TokenKind::Bang => Some(OpCode::Not),
        _ => None,
    }
}

fn binary_op(kind: TokenKind) -> Option<OpCode> {
    match kind {
        TokenKind::Plus => Some(OpCode::Add),
        TokenKind::Minus => Some(OpCode::Subtract),
        TokenKind::Star => Some(OpCode::Multiply),
        TokenKind::Slash => Some(OpCode::Divide),
        TokenKind::EqualEqual => Some(OpCode::Equal),
        TokenKind::Greater => Some(OpCode::Greater),
        TokenKind::Less => Some(OpCode::Less),
        _ => None,
    }
}

/// Compile a source string into a chunk.
pub fn compile(source: &str) -> CompileResult<Chunk> {
    Compiler::new(source).compile()
}

/// The bytecode compiler. `current` and `previous` are the single token of
/// lookahead; there is no backtracking.
pub struct Compiler<'src> {
    scanner: Scanner<'src>,
    current: Token,
    previous: Token,
    chunk: Chunk,
}

impl<'src> Compiler<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            scanner: Scanner::new(source),
            current: Token::eof(0, 1, 1),
            previous: Token::eof(0, 1, 1),
            chunk: Chunk::new(),
        }
    }

    /// Compile one or more back-to-back expressions, then append the final
    /// `Return`.
    fn compile(mut self) -> CompileResult<Chunk> {
        self.advance();

        loop {
            match self.current.kind {
                TokenKind::Error => {
                    return Err(CompileError::new(
                        self.current.lexeme.clone(),
                        self.current.span,
                    ));
                }
                TokenKind::Eof => break,
                _ => self.expression()?,
            }
        }

        self.emit(OpCode::Return);

        Ok(self.chunk)
    }

    fn advance(&mut self) {
        let next = self.scanner.next_token();
        self.previous = std::mem::replace(&mut self.current, next);
    }

    fn consume(&mut self, expected: TokenKind) -> CompileResult<()> {
        if self.current.kind != expected {
            return Err(CompileError::new(
                format!("expected {}, got {}", expected, self.current.kind),
                self.current.span,
            ));
        }
        self.advance();
        Ok(())
    }

    fn expression(&mut self) -> CompileResult<()> {
        self.parse(Precedence::Assignment)
    }

    /// Precedence-climbing core: run the prefix handler for the token just
    /// consumed, then infix handlers for as long as the next token binds
    /// at least as tightly as `min_prec`.
    fn parse(&mut self, min_prec: Precedence) -> CompileResult<()> {
        self.advance();

        let rule = rule_for(&self.previous)?;
        let Some(prefix) = rule.prefix else {
            return Err(CompileError::new(
                format!("no expression can start with {}", self.previous.kind),
                self.previous.span,
            ));
        };
        self.dispatch(prefix)?;

        loop {
            let rule = rule_for(&self.current)?;
            let Some(infix) = rule.infix.filter(|_| rule.precedence >= min_prec) else {
                break;
            };
            self.advance();
            self.dispatch(infix)?;
        }

        Ok(())
    }

    fn dispatch(&mut self, handler: ParseFn) -> CompileResult<()> {
        match handler {
            ParseFn::Literal => self.literal(),
            ParseFn::Number => self.number(),
            ParseFn::Grouping => self.grouping(),
            ParseFn::Unary => self.unary(),
            ParseFn::Binary => self.binary(),
        }
    }

    /// `nil`, `false` or `true`: one constant-free instruction.
    fn literal(&mut self) -> CompileResult<()> {
        let op = literal_op(self.previous.kind).ok_or_else(|| {
            CompileError::new(
                format!("unknown literal token: {}", self.previous.kind),
                self.previous.span,
            )
        })?;
        self.emit(op);
        Ok(())
    }

    /// A number literal becomes a pool constant plus a `Constant`
    /// instruction carrying its one-byte index.
    fn number(&mut self) -> CompileResult<()> {
        let number: f64 = self.previous.lexeme.parse().map_err(|_| {
            CompileError::new(
                format!("invalid number literal '{}'", self.previous.lexeme),
                self.previous.span,
            )
        })?;

        let index = self.chunk.add_constant(Value::Number(number));
        if index >= MAX_CONSTANTS {
            return Err(CompileError::new("too many constants", self.previous.span));
        }

        let line = self.previous.line() as u32;
        self.chunk.write_op(OpCode::Constant, line);
        self.chunk.write_byte(index as u8, line);
        Ok(())
    }

    /// `(` prefix: an inner expression followed by a required `)`.
    fn grouping(&mut self) -> CompileResult<()> {
        self.expression()?;
        self.consume(TokenKind::RightParen)
    }

    /// Prefix operator: parse the operand at `Unary` precedence, then emit
    /// the operator's instruction.
    fn unary(&mut self) -> CompileResult<()> {
        let operator = self.previous.clone();

        self.parse(Precedence::Unary)?;

        let op = unary_op(operator.kind).ok_or_else(|| {
            CompileError::new(
                format!("unknown unary operator: {}", operator.kind),
                operator.span,
            )
        })?;
        self.emit(op);
        Ok(())
    }

    /// Infix operator: the left operand is already emitted; parse the
    /// right operand one level tighter, then emit the operator.
    fn binary(&mut self) -> CompileResult<()> {
        let operator = self.previous.clone();
        let rule = rule_for(&operator)?;

        self.parse(rule.precedence.next())?;

        let op = binary_op(operator.kind).ok_or_else(|| {
            CompileError::new(
                format!("unknown binary operator: {}", operator.kind),
                operator.span,
            )
        })?;
        self.emit(op);
        Ok(())
    }

    fn emit(&mut self, op: OpCode) {
        self.chunk.write_op(op, self.previous.line() as u32);
    }
}

fn rule_for(token: &Token) -> CompileResult<ParseRule> {
    parse_rule(token.kind).ok_or_else(|| {
        CompileError::new(format!("unknown token type: {}", token.kind), token.span)
    })
}
