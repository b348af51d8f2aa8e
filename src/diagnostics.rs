use std::io::{self, IsTerminal, Write};

use nu_ansi_term::Color;

use crate::{CompileError, ConfigError, RuntimeError};

/// The stable, user-facing message for a compile failure.
pub fn compile_message(err: &CompileError) -> String {
    match err {
        CompileError::UnmatchedLeft { .. } => "Compilation failed: Unmatched left brackets.".to_string(),
        CompileError::TooLong { capacity } => {
            format!("Compilation failed: Program too long ({capacity} commands maximum).")
        }
        CompileError::UnmatchedRight { .. } => "Compilation failed: Unmatched right brackets.".to_string(),
        CompileError::Io(source) => format!("Compilation failed: Failed to read program: {source}."),
    }
}

/// The stable, user-facing message for an execution failure.
pub fn runtime_message(err: &RuntimeError) -> String {
    match err {
        RuntimeError::InputFailure { .. } => "Execution failed: Input error.".to_string(),
        RuntimeError::OutputFailure { .. } => "Execution failed: Output error.".to_string(),
    }
}

/// The user-facing message for rejected limits.
pub fn config_message(err: &ConfigError) -> String {
    format!("Configuration failed: {err}.")
}

pub fn print_config_error(err: &ConfigError) {
    print_failure(&config_message(err));
}

pub fn print_compile_error(err: &CompileError) {
    print_failure(&compile_message(err));
}

pub fn print_runtime_error(err: &RuntimeError) {
    print_failure(&runtime_message(err));
}

/// Print a failure line to stderr, highlighting the phase prefix on a terminal.
pub fn print_failure(message: &str) {
    let stderr = io::stderr();
    let line = match message.split_once(": ") {
        Some((phase, detail)) if stderr.is_terminal() => {
            format!("{}: {detail}", Color::Red.bold().paint(phase))
        }
        _ => message.to_string(),
    };
    let mut handle = stderr.lock();
    let _ = writeln!(handle, "{line}");
    let _ = handle.flush();
}
