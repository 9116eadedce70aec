use std::{borrow::Cow, env, fmt, io};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;
use tracing::debug;

use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::io::{ConsolePrompter, LinePrompter};
use crate::cli::output;
use crate::core::Books;
use crate::errors::LedgerError;
use crate::utils::PathResolver;
use crate::wizard::Prompter;

/// Presence of this variable switches the shell to line-by-line stdin input.
pub const SCRIPT_ENV: &str = "POCKET_LEDGER_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    if mode == CliMode::Script {
        output::disable_colors();
    }

    let paths = PathResolver::from_env();
    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => {}
        Some("init") => return init_books(&paths),
        Some(other) => {
            return Err(CliError::Usage(format!(
                "Unknown argument `{other}`. Usage: pocket_ledger [init]"
            )))
        }
    }

    let mut context = match ShellContext::new(mode, paths) {
        Ok(context) => context,
        Err(CliError::Ledger(LedgerError::MissingStore(path))) => {
            output::info("Run `pocket_ledger init` and fill in your starting balances first.");
            return Err(LedgerError::MissingStore(path).into());
        }
        Err(err) => return Err(err),
    };

    match context.mode() {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn init_books(paths: &PathResolver) -> Result<(), CliError> {
    if Books::bootstrap(paths)? {
        output::success(format!("Initialized ledger in {}", paths.root().display()));
        output::info(format!(
            "Add your accounts to {}",
            paths.initial_balances_file().display()
        ));
    } else {
        output::info(format!(
            "Ledger already initialized in {}",
            paths.root().display()
        ));
    }
    Ok(())
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    let helper = CommandHelper::new(context.command_names());
    editor.set_helper(Some(helper));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
    let mut prompter = ConsolePrompter::new()?;

    output::info("Type `help` to see available commands.");
    loop {
        if !context.running {
            break;
        }
        let line = editor.readline(context.prompt());

        match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                editor.add_history_entry(trimmed).ok();

                match handle_line(context, trimmed, &mut prompter) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => context.report_error(err),
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

/// Commands and wizard answers share one line stream.
fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    let mut prompter = LinePrompter::new(stdin.lock());
    while context.running {
        let line = match prompter.ask(context.prompt()) {
            Ok(line) => line,
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err.into()),
        };
        match handle_line(context, &line, &mut prompter) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => {
                let closed = err.is_input_closed();
                context.report_error(err);
                if closed {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn handle_line(
    context: &mut ShellContext,
    line: &str,
    prompter: &mut dyn Prompter,
) -> Result<LoopControl, CommandError> {
    let tokens = match parse_command_line(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(&err.message);
            return Ok(LoopControl::Continue);
        }
    };

    if tokens.is_empty() {
        return Ok(LoopControl::Continue);
    }

    let command = tokens[0].to_lowercase();
    let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
    debug!(command = %command, args = args.len(), "dispatching command");

    match context.dispatch(&command, &args, prompter) {
        Ok(LoopControl::Exit) => {
            context.running = false;
            Ok(LoopControl::Exit)
        }
        other => other,
    }
}

struct CommandHelper {
    commands: Vec<String>,
}

impl CommandHelper {
    fn new(names: Vec<&'static str>) -> Self {
        let mut commands: Vec<String> = names
            .into_iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();
        commands.sort();
        commands.dedup();
        Self { commands }
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);

        // Only the command word completes.
        if !prefix[..start].trim().is_empty() {
            return Ok((start, Vec::new()));
        }

        let needle = prefix[start..].to_ascii_lowercase();
        let candidates = self
            .commands
            .iter()
            .filter(|name| name.starts_with(&needle))
            .map(|name| Pair {
                display: name.clone(),
                replacement: name.clone(),
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for CommandHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
