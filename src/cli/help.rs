use crate::cli::output::{info, section};

#[derive(Debug, Clone, Copy)]
pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandEntry] = &[
    CommandEntry {
        name: "add",
        description: "Enter a new transaction",
        usage: "add",
    },
    CommandEntry {
        name: "balance",
        description: "Fold pending transactions into history and balances",
        usage: "balance",
    },
    CommandEntry {
        name: "recalculate",
        description: "Rebuild current balances from the seed and full history",
        usage: "recalculate",
    },
    CommandEntry {
        name: "report",
        description: "Income and expense breakdowns of the history",
        usage: "report",
    },
    CommandEntry {
        name: "edit",
        description: "Replace a historic transaction",
        usage: "edit [column] [value]",
    },
    CommandEntry {
        name: "account",
        description: "Add an account with its starting balance",
        usage: "account <name> <initial balance>",
    },
    CommandEntry {
        name: "pending",
        description: "List transactions waiting for the next balance run",
        usage: "pending",
    },
    CommandEntry {
        name: "config",
        description: "Show or change settings",
        usage: "config [setting] [on|off]",
    },
    CommandEntry {
        name: "help",
        description: "Show available commands",
        usage: "help [command]",
    },
    CommandEntry {
        name: "exit",
        description: "Leave the shell",
        usage: "exit",
    },
];

pub fn find(name: &str) -> Option<&'static CommandEntry> {
    COMMANDS.iter().find(|entry| entry.name == name)
}

pub fn print_overview() {
    section("Available commands");
    for entry in COMMANDS {
        info(format!("  {:<16} {}", entry.name, entry.description));
    }
    info("Use `help <command>` for details.");
    info("At any wizard prompt: `back`, `repeat`, `cancel` or `quit`.");
}

pub fn print_command(entry: &CommandEntry) {
    section(format!("Help: {}", entry.name));
    info(format!("  Description: {}", entry.description));
    info(format!("  Usage: {}", entry.usage));
}
