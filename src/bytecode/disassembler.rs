//! Bytecode disassembler for diagnostics.

use std::fmt::Write;

use crate::bytecode::chunk::Chunk;
use crate::bytecode::instruction::OpCode;

/// Disassemble a chunk into human-readable output under a header.
pub fn disassemble_chunk(chunk: &Chunk, name: &str) -> String {
    let mut output = String::new();
    writeln!(&mut output, "== {} ==", name).unwrap();

    let mut offset = 0;
    while offset < chunk.code.len() {
        offset = disassemble_instruction(chunk, offset, &mut output);
    }

    output
}

/// Disassemble a single instruction, returning the offset of the next one.
pub fn disassemble_instruction(chunk: &Chunk, offset: usize, output: &mut String) -> usize {
    write!(output, "{:04} ", offset).unwrap();

    // Line number, or | when unchanged from the previous byte.
    let line = chunk.line(offset);
    if offset > 0 && line == chunk.line(offset - 1) {
        write!(output, "   | ").unwrap();
    } else {
        write!(output, "{:4} ", line).unwrap();
    }

    let byte = chunk.code[offset];
    let Some(opcode) = OpCode::from_u8(byte) else {
        writeln!(output, "unknown opcode {}", byte).unwrap();
        return offset + 1;
    };

    match opcode {
        OpCode::Constant => {
            let index = chunk.code[offset + 1] as usize;
            match chunk.constants.get(index) {
                Some(value) => {
                    writeln!(output, "{:<10} {:3} ({})", "Constant", index, value).unwrap()
                }
                None => writeln!(output, "{:<10} {:3} (?)", "Constant", index).unwrap(),
            }
        }
        _ => writeln!(output, "{:?}", opcode).unwrap(),
    }

    offset + 1 + opcode.operand_size()
}
