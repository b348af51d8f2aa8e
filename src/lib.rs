//! A run-length folding Brainfuck compiler and virtual machine.
//!
//! Source goes through two stages:
//! - [`compile`] reads the source one byte at a time and emits a dense
//!   [`Program`]: runs of `+`/`-` and `>`/`<` become one instruction with a
//!   signed count, and every `[`/`]` carries its precomputed jump target.
//! - [`Machine::execute`] runs that program against a fixed-size tape.
//!
//! Behaviors:
//! - Tape and program capacity default to 65,536 (see [`Limits`]).
//! - The data pointer wraps around the tape in both directions.
//! - Cells hold a Unicode scalar; `,` reads one UTF-8 character and `.`
//!   writes one.
//! - Reading past the end of input aborts the run with
//!   [`RuntimeError::InputFailure`].
//! - Any character outside `+-<>,.[]` is a comment.
//!
//! Quick start:
//!
//! ```no_run
//! use rle_bf::{compile_str, Machine, DEFAULT_PROGRAM_CAPACITY};
//!
//! let code = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
//! let program = compile_str(code, DEFAULT_PROGRAM_CAPACITY).expect("program should compile");
//! let mut vm = Machine::new(std::io::stdin(), std::io::stdout());
//! vm.execute(&program).expect("program should run");
//! ```

pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod logging;
pub mod program;
pub mod vm;

pub use compiler::{CompileError, compile, compile_str};
pub use config::{ConfigError, Limits};
pub use program::{DEFAULT_PROGRAM_CAPACITY, DEFAULT_TAPE_SIZE, Instruction, Op, Program};
pub use vm::{Machine, RuntimeError};
