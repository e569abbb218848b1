//! cmdblock - command block evaluator
//!
//! Usage:
//!   cmdblock              Start interactive REPL
//!   cmdblock -c "cmd"     Evaluate a single command
//!   cmdblock script.txt   Evaluate a script file

mod cli;
mod repl;

use cli::{build_evaluator, execute_command, execute_script, parse_args, print_help, print_version};
use std::env;
use std::process::ExitCode;

fn init_logging(trace: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if trace {
        builder.filter_level(log::LevelFilter::Trace);
    }
    builder.init();
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("cmdblock: {}", e);
            eprintln!("Try 'cmdblock --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if cli.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    if cli.version {
        print_version();
        return ExitCode::SUCCESS;
    }

    init_logging(cli.trace);
    let mut eval = build_evaluator(&cli);

    // Evaluate a single command
    if let Some(cmd) = &cli.command {
        return execute_command(&mut eval, cmd);
    }

    // Evaluate a script
    if let Some(script) = &cli.script {
        return execute_script(&mut eval, script);
    }

    match repl::run_repl(&mut eval) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("REPL error: {}", e);
            ExitCode::FAILURE
        }
    }
}
