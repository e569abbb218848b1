use cmdblock::display::DisplayOptions;
use cmdblock::eval::{CONSTANTS, FUNCTIONS};
use cmdblock::Evaluator;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper, Result as RlResult};
use std::borrow::Cow;
use std::path::PathBuf;

use crate::cli::{print_help, print_output};

const PROMPT: &str = "cmd> ";

const REPL_WORDS: &[&str] = &["rand(", "randf(", ".help", ".config", "exit", "quit"];

/// Tab completion and inline hints for allow-listed names
struct CmdHelper {
    words: Vec<String>,
}

impl CmdHelper {
    fn new() -> Self {
        let mut words: Vec<String> = FUNCTIONS.iter().map(|f| format!("{}(", f.name)).collect();
        words.extend(CONSTANTS.iter().map(|(name, _)| name.to_string()));
        words.extend(REPL_WORDS.iter().map(|w| w.to_string()));
        words.sort();
        words.dedup();
        CmdHelper { words }
    }

    fn matching(&self, prefix: &str) -> Vec<&str> {
        self.words
            .iter()
            .filter(|w| w.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }
}

/// Start of the word under the cursor
fn word_start(line: &str, pos: usize) -> usize {
    line[..pos]
        .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
        .map(|i| i + 1)
        .unwrap_or(0)
}

impl Helper for CmdHelper {}

impl Completer for CmdHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = word_start(line, pos);
        let prefix = &line[start..pos];
        if prefix.is_empty() {
            return Ok((start, Vec::new()));
        }

        let pairs = self
            .matching(prefix)
            .into_iter()
            .map(|w| Pair { display: w.to_string(), replacement: w.to_string() })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for CmdHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        let start = word_start(line, pos);
        let prefix = &line[start..pos];
        if prefix.len() < 2 {
            return None;
        }
        // Only hint when the completion is unambiguous
        match self.matching(prefix).as_slice() {
            [only] if only.len() > prefix.len() => Some(only[prefix.len()..].to_string()),
            _ => None,
        }
    }
}

impl Highlighter for CmdHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[90m{}\x1b[0m", hint))
    }
}

impl Validator for CmdHelper {}

fn history_path() -> Option<PathBuf> {
    cmdblock::config::dirs_home().map(|h| h.join(".cmdblock_history"))
}

/// Run the interactive loop until `exit`, `quit` or Ctrl-D
pub(crate) fn run_repl(eval: &mut Evaluator) -> RlResult<()> {
    let mut rl: Editor<CmdHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CmdHelper::new()));

    let history = history_path();
    if let Some(ref path) = history {
        let _ = rl.load_history(path);
    }

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(trimmed);

                match trimmed {
                    "exit" | "quit" => break,
                    ".help" | ".h" => {
                        print_help();
                        continue;
                    }
                    ".config" => {
                        match serde_json::to_string_pretty(eval.config()) {
                            Ok(s) => println!("{}", s),
                            Err(e) => eprintln!("Error: {}", e),
                        }
                        continue;
                    }
                    _ => {}
                }

                let out = eval.run(trimmed);
                print_output(&out, eval.config().json, DisplayOptions::interactive());
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C abandons the current line only
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D - exit
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    if let Some(ref path) = history {
        let _ = rl.save_history(path);
    }

    Ok(())
}
