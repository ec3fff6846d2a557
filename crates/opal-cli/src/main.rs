//! OpalDB interactive shell.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use opal_server::config::ServerConfig;
use opal_server::database::Database;

mod formatter;
mod repl;

/// OpalDB interactive shell
#[derive(Parser, Debug)]
#[command(name = "opal", version, about = "Interactive SQL shell for OpalDB")]
struct Args {
    /// Replay log path
    #[arg(short = 'd', long, default_value = "data.db", env = "DBMS_DATA_PATH")]
    data_path: PathBuf,

    /// Run without persistence (no replay log)
    #[arg(long)]
    memory: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::new().with_data_path(args.data_path);
    if args.memory {
        config = config.in_memory();
    }

    let db = Database::open(&config).context("failed to open database")?;
    repl::Repl::new(Arc::new(db)).run()
}
