use clap::Parser;
use rle_bf::diagnostics::{print_compile_error, print_config_error, print_failure, print_runtime_error};
use rle_bf::config::MAX_LIMIT;
use rle_bf::{Limits, Machine, Program, compile, logging};
use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

fn print_usage(program: &str) {
    print!(
        r#"Usage: {0} [-h | [--dump] [--capacity N] [--tape-size N] [script]]
Options and arguments:
  script  The script file to run.
          If omitted the script will be read from stdin.
  -h      Display this help message and quit.
  --dump  Print the compiled instructions to stderr before running.
  --capacity <N>   Maximum compiled instructions (fallback RLEBF_PROGRAM_CAPACITY; default 65536)
  --tape-size <N>  Number of tape cells (fallback RLEBF_TAPE_SIZE; default 65536)
                   Both accept at most {1}.
"#,
        program, MAX_LIMIT
    );
    let _ = io::stdout().flush();
}

#[derive(Parser, Debug)]
#[command(name = "rlebf", disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    /// Print the compiled instructions to stderr before running
    #[arg(long = "dump")]
    dump: bool,

    /// Maximum number of compiled instructions
    #[arg(long = "capacity", value_name = "N")]
    capacity: Option<usize>,

    /// Number of tape cells
    #[arg(long = "tape-size", value_name = "N")]
    tape_size: Option<usize>,

    /// Script file; the program is read from stdin when omitted
    #[arg(value_name = "script")]
    script: Option<PathBuf>,
}

fn run(program_name: &str, cli: Cli) -> i32 {
    if cli.help {
        print_usage(program_name);
        return 0;
    }

    let limits = match Limits::resolve(cli.capacity, cli.tape_size) {
        Ok(limits) => limits,
        Err(err) => {
            print_config_error(&err);
            return 1;
        }
    };
    let mut program = Program::with_capacity(limits.program_capacity);

    // The source stream is dropped at the end of this block, before execution starts.
    let compiled = match &cli.script {
        Some(path) => match File::open(path) {
            Ok(file) => compile(file, &mut program),
            Err(_) => {
                print_failure(&format!("Failed to read file {}.", path.display()));
                return 1;
            }
        },
        None => compile(io::stdin().lock(), &mut program),
    };

    if let Err(err) = compiled {
        print_compile_error(&err);
        return 1;
    }

    if cli.dump {
        eprint!("{program}");
        let _ = io::stderr().flush();
    }

    let stdout = io::stdout();
    let mut vm = Machine::with_tape_size(limits.tape_size, io::stdin().lock(), BufWriter::new(stdout.lock()));
    match vm.execute(&program) {
        Ok(()) => 0,
        Err(err) => {
            print_runtime_error(&err);
            1
        }
    }
}

fn main() {
    logging::init();

    // We still pull the program name for help rendering consistency
    let program_name = env::args().next().unwrap_or_else(|| String::from("rlebf"));

    let cli = Cli::parse();
    let code = run(&program_name, cli);
    std::process::exit(code);
}
