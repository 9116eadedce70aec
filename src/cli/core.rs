use std::io;

use chrono::Local;
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;

use crate::cli::{help, io as cli_io, output};
use crate::config::{Config, ConfigManager};
use crate::core::{BalanceRun, Books, EditOutcome};
use crate::errors::LedgerError;
use crate::ledger::{Balances, Column};
use crate::utils::PathResolver;
use crate::wizard::{ControlWord, Prompter, WizardResult};

const PROMPT: &str = "pocket_ledger> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("{0}")]
    Usage(String),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
}

impl CommandError {
    /// Input ran out in the middle of a command; nothing more can be read.
    pub(crate) fn is_input_closed(&self) -> bool {
        let io_err = match self {
            CommandError::Io(err) | CommandError::Ledger(LedgerError::Io(err)) => err,
            _ => return false,
        };
        io_err.kind() == io::ErrorKind::UnexpectedEof
    }
}

pub struct ShellContext {
    mode: CliMode,
    books: Books,
    config_manager: ConfigManager,
    config: Config,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode, paths: PathResolver) -> Result<Self, CliError> {
        let config_manager = ConfigManager::new(&paths);
        let config = config_manager.load()?;
        let books = Books::open(paths)?;
        Ok(Self {
            mode,
            books,
            config_manager,
            config,
            running: true,
        })
    }

    pub(crate) fn mode(&self) -> CliMode {
        self.mode
    }

    pub(crate) fn prompt(&self) -> &'static str {
        PROMPT
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        help::COMMANDS.iter().map(|entry| entry.name).collect()
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        args: &[&str],
        prompter: &mut dyn Prompter,
    ) -> Result<LoopControl, CommandError> {
        match command {
            "add" => self.cmd_add(prompter)?,
            "balance" => self.cmd_balance()?,
            "recalculate" => self.cmd_recalculate()?,
            "report" => self.cmd_report()?,
            "edit" => self.cmd_edit(args, prompter)?,
            "account" => self.cmd_account(args)?,
            "pending" => self.cmd_pending()?,
            "config" => self.cmd_config(args)?,
            "help" => cmd_help(args),
            "exit" | "quit" => return Ok(LoopControl::Exit),
            other => self.suggest_command(other),
        }
        Ok(LoopControl::Continue)
    }

    fn cmd_add(&mut self, prompter: &mut dyn Prompter) -> Result<(), CommandError> {
        match self.books.add_transaction(prompter)? {
            WizardResult::Completed(record) => {
                output::success(format!("Saved pending transaction `{}`.", record.name));
                output::info("Run `balance` to fold it into your books.");
            }
            WizardResult::Cancelled => output::info("Transaction discarded."),
        }
        Ok(())
    }

    fn cmd_balance(&mut self) -> Result<(), CommandError> {
        let run = self.books.calculate_balances()?;
        output::success(format!("Merged {} pending transaction(s).", run.merged));
        self.print_balances(&run);
        Ok(())
    }

    fn cmd_recalculate(&mut self) -> Result<(), CommandError> {
        let run = self.books.recalculate()?;
        output::success(format!(
            "Recomputed balances from {} transaction(s).",
            self.books.history().len()
        ));
        self.print_balances(&run);
        Ok(())
    }

    fn print_balances(&self, run: &BalanceRun) {
        print_balance_table(&run.balances);
        if self.config.show_net_worth {
            output::info(format!("Net worth: {:.2}", run.net_worth()));
        }
    }

    fn cmd_report(&self) -> Result<(), CommandError> {
        let today = Local::now().date_naive();
        for table in self.books.reports(today) {
            if self.config.print_reports {
                output::section(format!("{} report", table.kind));
                output::raw(table.render());
            }
            if self.config.write_report_files {
                let location = self.books.write_report(&table)?;
                output::info(format!("Report written to {location}"));
            }
        }
        Ok(())
    }

    fn cmd_edit(&mut self, args: &[&str], prompter: &mut dyn Prompter) -> Result<(), CommandError> {
        let column = match args.first() {
            Some(name) => Column::parse(name)?,
            None => match ask_column(prompter)? {
                Some(column) => column,
                None => {
                    output::info("Edit cancelled.");
                    return Ok(());
                }
            },
        };
        let key = if args.len() > 1 {
            args[1..].join(" ")
        } else {
            prompter.ask(&format!("{column} to search for: "))?
        };

        match self.books.edit(prompter, column, &key)? {
            EditOutcome::NoMatch => output::warning(format!("No transaction has {column} `{key}`.")),
            EditOutcome::Declined => output::info("No transaction selected."),
            EditOutcome::Cancelled => output::info("Edit cancelled."),
            EditOutcome::Replaced { removed, record } => {
                output::success(format!(
                    "Removed {} -> {} {:.2}; replacement pending as `{}`.",
                    removed.from, removed.to, removed.amount, record.name
                ));
            }
        }
        Ok(())
    }

    fn cmd_account(&mut self, args: &[&str]) -> Result<(), CommandError> {
        let [name, amount] = args else {
            return Err(CommandError::InvalidArguments(
                "Usage: account <name> <initial balance>".into(),
            ));
        };
        let initial: f64 = amount.trim().parse().map_err(|_| {
            CommandError::InvalidArguments(format!("`{amount}` is not a numeric balance"))
        })?;
        self.books.add_account(name, initial)?;
        output::success(format!("Added account `{}` with {:.2}.", name.trim(), initial));
        Ok(())
    }

    fn cmd_pending(&self) -> Result<(), CommandError> {
        let records = self.books.pending()?;
        if records.is_empty() {
            output::info("No pending transactions.");
            return Ok(());
        }
        output::section("Pending");
        for record in records {
            let txn = &record.transaction;
            output::info(format!(
                "  {:<32} {} -> {} {:.2}",
                record.name, txn.from, txn.to, txn.amount
            ));
        }
        Ok(())
    }

    fn cmd_config(&mut self, args: &[&str]) -> Result<(), CommandError> {
        match args {
            [] => {
                output::section("Settings");
                for key in Config::FLAGS {
                    let value = self.config.flag(key).unwrap_or_default();
                    output::info(format!("  {:<20} {}", key, on_off(value)));
                }
            }
            [key, value] => {
                let value = parse_switch(value).ok_or_else(|| {
                    CommandError::InvalidArguments(format!("Expected on or off, got `{value}`"))
                })?;
                if !self.config.set_flag(key, value) {
                    return Err(CommandError::InvalidArguments(format!(
                        "Unknown setting `{key}`"
                    )));
                }
                self.config_manager.save(&self.config)?;
                output::success(format!("{key} is now {}.", on_off(value)));
                output::info(format!("Saved to {}", self.config_manager.path().display()));
            }
            _ => {
                return Err(CommandError::InvalidArguments(
                    "Usage: config [setting] [on|off]".into(),
                ))
            }
        }
        Ok(())
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = help::COMMANDS
            .iter()
            .map(|entry| (levenshtein(entry.name, input), entry.name))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                output::info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(cli_io::confirm_action("Exit shell?")?)
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help <command>` for usage details.");
            }
            CommandError::Ledger(LedgerError::UnknownColumn(column)) => {
                output::error(format!("Unknown column: `{column}`"));
                output::info("Columns are Date, From, To, Memo, Amount and Category1, Category2, ...");
            }
            other => output::error(other),
        }
    }
}

fn cmd_help(args: &[&str]) {
    match args.first() {
        Some(name) => match help::find(&name.to_ascii_lowercase()) {
            Some(entry) => help::print_command(entry),
            None => output::warning(format!("No help for `{name}`.")),
        },
        None => help::print_overview(),
    }
}

/// Re-asks until a known column is named. `None` when the user backs out.
fn ask_column(prompter: &mut dyn Prompter) -> Result<Option<Column>, CommandError> {
    loop {
        let answer = prompter.ask("Column to search (Date, From, To, Memo, Amount, CategoryN): ")?;
        if ControlWord::parse(&answer).is_some() {
            return Ok(None);
        }
        match Column::parse(&answer) {
            Ok(column) => return Ok(Some(column)),
            Err(err) => output::warning(err),
        }
    }
}

fn print_balance_table(balances: &Balances) {
    output::section("Balances");
    for entry in balances.rounded() {
        output::info(format!("  {:<24} {:>12.2}", entry.account, entry.balance));
    }
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
