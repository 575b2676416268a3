//! Stack-based virtual machine for executing chunks.

use std::io::{self, Write};

use crate::bytecode::chunk::Chunk;
use crate::bytecode::instruction::OpCode;
use crate::bytecode::value::Value;
use crate::error::RuntimeError;

/// Result type for VM operations.
pub type VmResult<T> = Result<T, RuntimeError>;

/// The virtual machine. Each `Return` instruction writes the value on top
/// of the stack to the output sink; use a fresh VM per chunk.
pub struct Vm<W: Write = io::Stdout> {
    stack: Vec<Value>,
    output: W,
}

impl Vm<io::Stdout> {
    /// A VM that prints returned values to stdout.
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            output: io::stdout(),
        }
    }
}

impl Default for Vm<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Vm<W> {
    /// A VM that writes returned values to the given sink.
    pub fn with_output(output: W) -> Self {
        Self {
            stack: Vec::new(),
            output,
        }
    }

    /// Execute a chunk against a fresh operand stack. Execution ends when
    /// the instruction pointer runs past the end of the code; the first
    /// error aborts and discards the stack.
    pub fn run(&mut self, chunk: &Chunk) -> VmResult<()> {
        self.stack.clear();

        let mut ip = 0;
        while ip < chunk.code.len() {
            #[cfg(feature = "trace")]
            {
                let mut text = String::new();
                crate::bytecode::disassembler::disassemble_instruction(chunk, ip, &mut text);
                eprint!("{}", text);
            }

            let byte = chunk.code[ip];
            ip += 1;

            let opcode = OpCode::from_u8(byte).ok_or(RuntimeError::UnknownOpcode(byte))?;

            match opcode {
                OpCode::Constant => {
                    let index = chunk.code[ip] as usize;
                    ip += 1;
                    let value = *chunk
                        .constants
                        .get(index)
                        .ok_or(RuntimeError::InvalidConstant(index))?;
                    self.push(value);
                }

                OpCode::Nil => self.push(Value::Nil),
                OpCode::False => self.push(Value::Bool(false)),
                OpCode::True => self.push(Value::Bool(true)),

                OpCode::Negate => {
                    let value = self.pop()?;
                    self.push(value.negate());
                }

                OpCode::Not => {
                    let value = self.pop()?;
                    self.push(value.not());
                }

                OpCode::Add => self.binary_op(Value::add)?,
                OpCode::Subtract => self.binary_op(Value::subtract)?,
                OpCode::Multiply => self.binary_op(Value::multiply)?,
                OpCode::Divide => self.binary_op(Value::divide)?,
                OpCode::Greater => self.binary_op(Value::greater)?,
                OpCode::Less => self.binary_op(Value::less)?,

                OpCode::Equal => {
                    let b = self.pop()?;
                    let a = self.pop()?;
                    self.push(Value::Bool(a == b));
                }

                // Not a control-flow exit: emits the current expression's
                // value and execution carries on.
                OpCode::Return => {
                    let value = self.pop()?;
                    writeln!(self.output, "{}", value)?;
                }
            }
        }

        Ok(())
    }

    fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    fn pop(&mut self) -> VmResult<Value> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow)
    }

    /// Pop the right operand first, then the left, apply, push the result.
    fn binary_op<F>(&mut self, op: F) -> VmResult<()>
    where
        F: FnOnce(Value, Value) -> VmResult<Value>,
    {
        let b = self.pop()?;
        let a = self.pop()?;
        let result = op(a, b)?;
        self.push(result);
        Ok(())
    }
}
