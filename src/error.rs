//! Error types for the compile and execution phases.

use std::io;

use thiserror::Error;

use crate::span::Span;

/// Compile-time errors. Scanning and parsing failures share one type since
/// the compiler pulls tokens straight off the scanner and aborts at the
/// first error; there is no recovery or multi-error reporting.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{message} at {span}")]
    General { message: String, span: Span },
}

impl CompileError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self::General {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::General { span, .. } => *span,
        }
    }

    pub fn line(&self) -> usize {
        self.span().line
    }
}

/// Errors raised while the VM is executing a chunk. All of them abort
/// execution; the operand stack is discarded.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("unknown opcode {0}")]
    UnknownOpcode(u8),

    #[error("invalid constant index {0}")]
    InvalidConstant(usize),

    #[error("stack underflow")]
    StackUnderflow,

    #[error("{0}")]
    Io(#[from] io::Error),
}

impl RuntimeError {
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch(message.into())
    }
}

/// A unified error type for the `run`/`run_file` entry points.
#[derive(Debug, Error)]
pub enum KestrelError {
    #[error("{0}")]
    Compile(#[from] CompileError),

    #[error("{0}")]
    Runtime(#[from] RuntimeError),

    #[error("{0}")]
    Io(#[from] io::Error),
}
