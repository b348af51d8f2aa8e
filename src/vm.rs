//! The virtual machine that runs a compiled [`Program`].
//!
//! Features and behaviors:
//! - A fixed-size tape of zeroed cells, each wide enough for a Unicode scalar.
//! - The data pointer wraps around both ends of the tape.
//! - Cell arithmetic wraps modulo 2^32.
//! - `,` decodes one UTF-8 character from the input per repetition; running
//!   out of input aborts the run.
//! - `.` encodes the current cell as UTF-8 once per repetition.

use std::io::{self, Read, Write};

use tracing::{debug, warn};

use crate::program::{DEFAULT_TAPE_SIZE, Op, Program};

/// Errors that can occur while executing a program.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The input was exhausted, unreadable or not valid UTF-8 during `,`.
    #[error("Input error at instruction {pc}")]
    InputFailure { pc: usize },

    /// The output rejected a write, or the cell held no encodable character, during `.`.
    #[error("Output error at instruction {pc}")]
    OutputFailure {
        pc: usize,
        #[source]
        source: Option<io::Error>,
    },
}

/// Executes programs against a tape, reading `,` input from `R` and writing `.` output to `W`.
///
/// The machine does not buffer output itself; wrap `W` in a
/// [`io::BufWriter`] when writing to a terminal or file. Output is flushed
/// before every `,` so a prompt is visible while input is awaited.
pub struct Machine<R, W> {
    tape: Vec<u32>,
    pointer: usize,
    input: R,
    output: W,
}

impl<R: Read, W: Write> Machine<R, W> {
    /// Create a machine with the default tape size.
    pub fn new(input: R, output: W) -> Self {
        Self::with_tape_size(DEFAULT_TAPE_SIZE, input, output)
    }

    /// Create a machine with `tape_size` cells (at least one).
    pub fn with_tape_size(tape_size: usize, input: R, output: W) -> Self {
        Self {
            tape: vec![0; tape_size.max(1)],
            pointer: 0,
            input,
            output,
        }
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn tape(&self) -> &[u32] {
        &self.tape
    }

    /// The value under the data pointer.
    pub fn cell(&self) -> u32 {
        self.tape[self.pointer]
    }

    /// Give back the output endpoint.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run `program` to completion.
    ///
    /// Output is flushed before returning, whether the run succeeded or not.
    pub fn execute(&mut self, program: &Program) -> Result<(), RuntimeError> {
        debug!(instructions = program.len(), tape = self.tape.len(), "executing program");
        let result = self.run(program);
        match &result {
            Ok(()) => {
                let len = program.len();
                self.output
                    .flush()
                    .map_err(|e| RuntimeError::OutputFailure { pc: len, source: Some(e) })?;
                debug!("program finished");
            }
            Err(err) => {
                let _ = self.output.flush();
                warn!(%err, "program aborted");
            }
        }
        result
    }

    fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        let instructions = program.instructions();
        let mut pc = 0;

        while let Some(instruction) = instructions.get(pc) {
            let param = instruction.param;
            match instruction.op {
                Op::Add => {
                    let cell = &mut self.tape[self.pointer];
                    *cell = cell.wrapping_add(param as u32);
                    pc += 1;
                }
                Op::Move => {
                    let size = self.tape.len() as i64;
                    self.pointer = (self.pointer as i64 + param).rem_euclid(size) as usize;
                    pc += 1;
                }
                Op::Input => {
                    // Anything already written (a prompt) must be visible before blocking on input.
                    self.output
                        .flush()
                        .map_err(|e| RuntimeError::OutputFailure { pc, source: Some(e) })?;
                    for _ in 0..param {
                        let ch = read_char(&mut self.input).ok_or(RuntimeError::InputFailure { pc })?;
                        self.tape[self.pointer] = u32::from(ch);
                    }
                    pc += 1;
                }
                Op::Output => {
                    let ch = char::from_u32(self.tape[self.pointer])
                        .ok_or(RuntimeError::OutputFailure { pc, source: None })?;
                    let mut buf = [0u8; 4];
                    let encoded = ch.encode_utf8(&mut buf).as_bytes();
                    for _ in 0..param {
                        self.output
                            .write_all(encoded)
                            .map_err(|e| RuntimeError::OutputFailure { pc, source: Some(e) })?;
                    }
                    pc += 1;
                }
                Op::LoopStart => {
                    pc = if self.tape[self.pointer] == 0 { param as usize } else { pc + 1 };
                }
                Op::LoopEnd => {
                    pc = if self.tape[self.pointer] != 0 { param as usize } else { pc + 1 };
                }
            }
        }

        Ok(())
    }
}

/// Decode a single UTF-8 character from `input`.
///
/// Returns `None` at end of input, on a read error, or on an invalid sequence.
fn read_char<R: Read>(input: &mut R) -> Option<char> {
    let mut buf = [0u8; 4];
    read_byte(input, &mut buf[..1])?;

    let width = match buf[0] {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return None,
    };
    for i in 1..width {
        read_byte(input, &mut buf[i..=i])?;
    }

    std::str::from_utf8(&buf[..width]).ok()?.chars().next()
}

fn read_byte<R: Read>(input: &mut R, slot: &mut [u8]) -> Option<()> {
    loop {
        match input.read(slot) {
            Ok(0) => return None,
            Ok(_) => return Some(()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => return None,
        }
    }
}
