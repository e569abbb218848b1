use cmdblock::display::{format_diagnostic, format_output, to_json, DisplayOptions};
use cmdblock::{CommandOutput, Config, Evaluator, Severity};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parsed command-line arguments
#[derive(Debug, Default)]
pub(crate) struct CliArgs {
    pub(crate) command: Option<String>,
    pub(crate) script: Option<String>,
    pub(crate) config: Option<PathBuf>,
    pub(crate) seed: Option<u64>,
    pub(crate) json: bool,
    pub(crate) help: bool,
    pub(crate) version: bool,
    pub(crate) trace: bool,
}

/// Parse command-line arguments
pub(crate) fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();

    let mut i = 1; // Skip program name
    while i < args.len() {
        match args[i].as_str() {
            "--trace" => {
                cli.trace = true;
            }
            "--json" => {
                cli.json = true;
            }
            "--seed" => {
                let raw = args.get(i + 1).ok_or("--seed needs a value")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("invalid seed '{}'", raw))?;
                cli.seed = Some(seed);
                i += 1;
            }
            "--config" => {
                let path = args.get(i + 1).ok_or("--config needs a path")?;
                cli.config = Some(PathBuf::from(path));
                i += 1;
            }
            "-c" => {
                // Everything after -c is the command
                if i + 1 < args.len() {
                    cli.command = Some(args[i + 1..].join(" "));
                    break;
                }
                return Err("-c needs a command".to_string());
            }
            "--help" | "-h" => {
                cli.help = true;
            }
            "--version" | "-V" => {
                cli.version = true;
            }
            path if !path.starts_with('-') => {
                cli.script = Some(path.to_string());
            }
            flag => return Err(format!("unknown option '{}'", flag)),
        }
        i += 1;
    }

    Ok(cli)
}

pub(crate) fn print_help() {
    println!(
        r#"cmdblock {} - command block evaluator

USAGE:
    cmdblock                    Start interactive REPL
    cmdblock -c <command>       Evaluate a single command
    cmdblock <script>           Evaluate each line of a file
    cmdblock --help             Show this help message
    cmdblock --version          Show version

OPTIONS:
    --json                      Print outputs as JSON
    --seed <N>                  Seed rand()/randf() for repeatable draws
    --config <path>             Read settings from a TOML file
    --trace                     Log every step to stderr

CONFIG:
    --config, then $CMDBLOCK_CONFIG, then ~/.cmdblock.toml

COMMANDS:
    A..E                        Letters A to E
    1..10..2                    Numbers 1 to 10 by 2
    0..1..@5                    5 evenly spaced numbers from 0 to 1
    A..@3..E                    3 evenly spaced letters from A to E
    3|1|2                       List, coerced to one type and sorted
    rand(min,max,count)         Unique random integers
    randf(min,max,count[,p])    Unique random doubles, p decimals (default 3)
    2+3*4                       Arithmetic: + - * / % ** and parentheses
    sqrt(16)                    abs sqrt pow rad deg sin cos tan asin acos
                                atan log log10 exp, constant pi
    anything else               Returned as text

REPL:
    .help                       Show this help
    .config                     Show the active settings
    exit, quit, Ctrl-D          Leave"#,
        VERSION
    );
}

pub(crate) fn print_version() {
    println!("cmdblock {}", VERSION);
}

/// Build the evaluator from the discovered config plus command-line overrides.
/// A broken config file is reported and replaced by the defaults.
pub(crate) fn build_evaluator(cli: &CliArgs) -> Evaluator {
    let mut config = match Config::discover(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {}", e);
            Config::default()
        }
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.json {
        config.json = true;
    }
    log::debug!("config: {:?}", config);
    Evaluator::with_config(config)
}

/// Print an output to stdout; warnings go to stderr
pub(crate) fn print_output(out: &CommandOutput, json: bool, opts: DisplayOptions) {
    if json {
        match to_json(out) {
            Ok(value) => println!("{}", value),
            Err(e) => eprintln!("JSON error: {}", e),
        }
        return;
    }
    if let Some(d) = &out.diagnostic {
        if d.severity == Severity::Warning {
            eprintln!("{}", format_diagnostic(d, opts));
            if out.string.is_none() && out.list.is_none() {
                return;
            }
        }
    }
    println!("{}", format_output(out, opts));
}

fn exit_code(out: &CommandOutput) -> ExitCode {
    if out.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Evaluate a single command
pub(crate) fn execute_command(eval: &mut Evaluator, cmd: &str) -> ExitCode {
    let out = eval.run(cmd);
    print_output(&out, eval.config().json, DisplayOptions::default());
    exit_code(&out)
}

/// Evaluate a script file, one command per line
pub(crate) fn execute_script(eval: &mut Evaluator, path: &str) -> ExitCode {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let json = eval.config().json;
    let mut last = None;
    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        log::debug!("{}:{}: {}", path, line_num + 1, trimmed);
        let out = eval.run(trimmed);
        print_output(&out, json, DisplayOptions::default());
        last = Some(out);
    }

    last.as_ref().map(exit_code).unwrap_or(ExitCode::SUCCESS)
}
