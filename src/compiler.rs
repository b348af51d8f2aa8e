//! Single-pass compiler from Brainfuck source to a [`Program`].
//!
//! The source is consumed one byte at a time with no lookahead. Any byte
//! outside `+-<>,.[]` is a comment. Consecutive `+`/`-` and `>`/`<` fold into
//! one signed instruction, repeats of `,` and `.` fold into a counted one, and
//! a fold that cancels to zero removes the instruction altogether.

use std::io::{self, BufReader, Read};

use tracing::{debug, trace};

use crate::program::{Instruction, Op, Program};

/// Errors that can occur while compiling Brainfuck source.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The source ended with loops still open.
    #[error("Unmatched left brackets ({open} unclosed)")]
    UnmatchedLeft { open: usize },

    /// A `]` was found with no open `[` to close.
    #[error("Unmatched right bracket at byte {offset}")]
    UnmatchedRight { offset: usize },

    /// The program needs more instructions than the buffer can hold.
    #[error("Program too long ({capacity} commands maximum)")]
    TooLong { capacity: usize },

    /// Reading the source stream failed.
    #[error("Failed to read program: {0}")]
    Io(#[from] io::Error),
}

/// Compile `source` into `program`, replacing its previous contents.
///
/// Returns the number of emitted instructions.
pub fn compile<R: Read>(source: R, program: &mut Program) -> Result<usize, CompileError> {
    program.clear();
    let mut compiler = Compiler {
        program,
        loops: Vec::new(),
    };

    for (offset, byte) in BufReader::new(source).bytes().enumerate() {
        compiler.feed(byte?, offset)?;
    }
    compiler.finish()
}

/// Compile an in-memory source into a fresh program holding up to `capacity` instructions.
pub fn compile_str(source: &str, capacity: usize) -> Result<Program, CompileError> {
    let mut program = Program::with_capacity(capacity);
    compile(source.as_bytes(), &mut program)?;
    Ok(program)
}

struct Compiler<'p> {
    program: &'p mut Program,
    // Indices of `[` instructions still waiting for their `]`.
    loops: Vec<usize>,
}

impl Compiler<'_> {
    fn feed(&mut self, byte: u8, offset: usize) -> Result<(), CompileError> {
        match byte {
            b'+' => self.fold(Op::Add, 1),
            b'-' => self.fold(Op::Add, -1),
            b'>' => self.fold(Op::Move, 1),
            b'<' => self.fold(Op::Move, -1),
            b',' => self.fold(Op::Input, 1),
            b'.' => self.fold(Op::Output, 1),
            b'[' => {
                let open = self.emit(Instruction::new(Op::LoopStart, 0))?;
                self.loops.push(open);
                Ok(())
            }
            b']' => self.close_loop(offset),
            _ => Ok(()),
        }
    }

    /// Merge `delta` into the last instruction when it has the same opcode,
    /// otherwise start a new run.
    fn fold(&mut self, op: Op, delta: i64) -> Result<(), CompileError> {
        match self.program.last_mut() {
            Some(last) if last.op == op => {
                last.param += delta;
                if last.param == 0 {
                    self.program.retract();
                }
                Ok(())
            }
            _ => self.emit(Instruction::new(op, delta)).map(|_| ()),
        }
    }

    fn close_loop(&mut self, offset: usize) -> Result<(), CompileError> {
        let Some(&open) = self.loops.last() else {
            return Err(CompileError::UnmatchedRight { offset });
        };
        let close = self.emit(Instruction::new(Op::LoopEnd, open as i64 + 1))?;
        if let Some(start) = self.program.get_mut(open) {
            start.param = close as i64 + 1;
        }
        self.loops.pop();
        trace!(open, close, "loop wired");
        Ok(())
    }

    fn emit(&mut self, instruction: Instruction) -> Result<usize, CompileError> {
        self.program.push(instruction).ok_or(CompileError::TooLong {
            capacity: self.program.capacity(),
        })
    }

    fn finish(self) -> Result<usize, CompileError> {
        if !self.loops.is_empty() {
            return Err(CompileError::UnmatchedLeft {
                open: self.loops.len(),
            });
        }
        debug!(instructions = self.program.len(), "compiled program");
        Ok(self.program.len())
    }
}
