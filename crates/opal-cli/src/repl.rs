//! Interactive SQL shell.
//!
//! Reads statements terminated by `;`, executes them against an embedded
//! database, and prints formatted results. `\q` quits, `\d` lists tables,
//! `\d <table>` shows a table's columns.

use std::borrow::Cow;
use std::sync::Arc;

use anyhow::Result;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};

use opal_server::database::{Database, StatementOutcome};

use crate::formatter;

/// Prompt shown when waiting for a new statement.
const PROMPT: &str = "opal> ";

/// Continuation prompt for unfinished statements.
const CONTINUATION_PROMPT: &str = "   -> ";

/// SQL keywords offered by tab completion.
const KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "INSERT", "INTO", "VALUES", "UPDATE", "SET", "DELETE", "CREATE",
    "TABLE", "DROP", "AND", "OR", "NOT", "NULL", "IS", "ORDER", "BY", "ASC", "DESC", "LIMIT",
    "AS", "CASE", "WHEN", "THEN", "ELSE", "END", "TRUE", "FALSE", "INT", "INTEGER", "VARCHAR",
];

/// rustyline helper providing keyword completion.
struct ReplHelper;

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || c == '(' || c == ',')
            .map(|i| i + 1)
            .unwrap_or(0);

        let word = line[start..pos].to_uppercase();
        let matches: Vec<Pair> = KEYWORDS
            .iter()
            .filter(|kw| kw.starts_with(&word))
            .map(|kw| Pair {
                display: kw.to_string(),
                replacement: kw.to_string(),
            })
            .collect();

        Ok((start, matches))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for ReplHelper {}

impl Helper for ReplHelper {}

/// The REPL loop.
pub struct Repl {
    db: Arc<Database>,
}

impl Repl {
    /// Creates a REPL over an opened database.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Runs until `\q` or end of input.
    pub fn run(&self) -> Result<()> {
        let mut editor: Editor<ReplHelper, DefaultHistory> = Editor::new()?;
        editor.set_helper(Some(ReplHelper));

        println!("OpalDB shell. Statements end with ';', \\q quits, \\d lists tables.");

        let mut buffer = String::new();
        loop {
            let prompt = if buffer.is_empty() {
                PROMPT
            } else {
                CONTINUATION_PROMPT
            };

            let line = match editor.readline(prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    buffer.clear();
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };

            let trimmed = line.trim();
            if buffer.is_empty() && trimmed.starts_with('\\') {
                let _ = editor.add_history_entry(trimmed);
                if !self.run_meta_command(trimmed) {
                    break;
                }
                continue;
            }

            if !trimmed.is_empty() {
                if !buffer.is_empty() {
                    buffer.push(' ');
                }
                buffer.push_str(trimmed);
            }

            if buffer.ends_with(';') {
                let sql = std::mem::take(&mut buffer);
                let _ = editor.add_history_entry(&sql);
                self.run_sql(&sql);
            }
        }

        Ok(())
    }

    /// Executes a meta command; returns false to quit.
    fn run_meta_command(&self, command: &str) -> bool {
        let mut parts = command.split_whitespace();
        match parts.next() {
            Some("\\q") => return false,
            Some("\\d") => match parts.next() {
                None => {
                    for name in self.db.table_names() {
                        println!("{}", name);
                    }
                }
                Some(table) => match self.db.describe(table) {
                    Ok(columns) => {
                        for (name, data_type) in columns {
                            println!("{}  {}", name, data_type);
                        }
                    }
                    Err(e) => println!("ERROR: {}", e),
                },
            },
            _ => println!("unknown command: {} (try \\q or \\d)", command),
        }
        true
    }

    /// Executes SQL and prints the outcomes.
    fn run_sql(&self, sql: &str) {
        match self.db.execute(sql) {
            Ok(outcomes) => {
                for outcome in outcomes {
                    match outcome {
                        StatementOutcome::Query(result) => {
                            print!("{}", formatter::format_table(&result));
                        }
                        StatementOutcome::Command => println!("OK"),
                    }
                }
            }
            Err(e) => println!("ERROR: {}", e),
        }
    }
}
