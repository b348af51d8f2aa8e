//! The compiled form of a Brainfuck program.
//!
//! A [`Program`] is a dense list of [`Instruction`]s. Runs of `+`/`-` and
//! `>`/`<` are folded into a single instruction carrying a signed count, and
//! loop instructions carry precomputed jump targets, so the virtual machine
//! never has to rescan the source.

use std::fmt;

/// Maximum number of instructions a program may compile to by default.
pub const DEFAULT_PROGRAM_CAPACITY: usize = 65536;

/// Number of cells on the tape by default.
pub const DEFAULT_TAPE_SIZE: usize = 65536;

/// Opcodes emitted by the compiler.
///
/// `-` and `<` have no opcode of their own: they are the negative direction of
/// [`Op::Add`] and [`Op::Move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Add `param` to the current cell.
    Add,
    /// Move the data pointer by `param` cells, wrapping around the tape.
    Move,
    /// Read a character into the current cell, `param` times.
    Input,
    /// Write the current cell, `param` times.
    Output,
    /// Jump to `param` when the current cell is zero.
    LoopStart,
    /// Jump to `param` when the current cell is non-zero.
    LoopEnd,
}

impl Op {
    /// The source character this opcode is listed as.
    pub fn symbol(self) -> char {
        match self {
            Op::Add => '+',
            Op::Move => '>',
            Op::Input => ',',
            Op::Output => '.',
            Op::LoopStart => '[',
            Op::LoopEnd => ']',
        }
    }
}

/// A single compiled instruction.
///
/// For `Add`, `Move`, `Input` and `Output`, `param` is a run-length count.
/// For the loop opcodes it is the index execution continues at when the jump
/// is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: Op,
    pub param: i64,
}

impl Instruction {
    pub fn new(op: Op, param: i64) -> Self {
        Self { op, param }
    }
}

/// An owned, capacity-bounded instruction buffer.
///
/// The buffer is filled by [`crate::compile`] and then only read by the
/// virtual machine. It can be reused across compilations; each compile
/// starts by clearing it.
#[derive(Debug, Clone)]
pub struct Program {
    instructions: Vec<Instruction>,
    capacity: usize,
}

impl Program {
    /// Create an empty program that can hold up to `capacity` instructions.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instructions: Vec::new(),
            capacity,
        }
    }

    /// The maximum number of instructions this buffer accepts.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    pub(crate) fn clear(&mut self) {
        self.instructions.clear();
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Instruction> {
        self.instructions.last_mut()
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Instruction> {
        self.instructions.get_mut(index)
    }

    /// Drop the most recently emitted instruction.
    pub(crate) fn retract(&mut self) {
        self.instructions.pop();
    }

    /// Append an instruction and return its index, or `None` when the buffer is full.
    pub(crate) fn push(&mut self, instruction: Instruction) -> Option<usize> {
        if self.instructions.len() >= self.capacity {
            return None;
        }
        self.instructions.push(instruction);
        Some(self.instructions.len() - 1)
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_PROGRAM_CAPACITY)
    }
}

/// One line per instruction: index, opcode symbol and parameter, tab separated.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{index}\t{}\t{}", instruction.op.symbol(), instruction.param)?;
        }
        Ok(())
    }
}
