//! Interactive shell over the Uproot core.
//!
//! # Responsibility
//! - Parse startup flags, bootstrap logging and the in-memory store.
//! - Read commands from stdin line by line and print their outcome.
//!
//! # Invariants
//! - A failed command prints `error: ...` and never ends the session.
//! - All state is dropped when the process exits.

mod shell;

use clap::Parser;
use log::info;
use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;
use uproot_core::db::open_db_in_memory;
use uproot_core::{core_version, default_log_level, init_logging, seed_demo_data};

#[derive(Parser, Debug)]
#[command(name = "uproot", version, about = "Grow a tree out of habits, goals and challenges")]
struct Args {
    /// Log level: trace, debug, info, warn or error.
    #[arg(long, default_value_t = default_log_level().to_string())]
    log_level: String,
    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long)]
    log_dir: Option<String>,
    /// Start without the demo habits, goals and challenges.
    #[arg(long)]
    empty: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(log_dir) = args.log_dir.as_deref() {
        if let Err(err) = init_logging(&args.log_level, log_dir) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }

    let conn = match open_db_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if !args.empty {
        match seed_demo_data(&conn) {
            Ok(summary) => println!(
                "seeded {} habits, {} goals, {} tasks, {} challenges",
                summary.habits, summary.goals, summary.tasks, summary.challenges
            ),
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    info!(
        "event=shell_start module=cli status=ok version={} seeded={}",
        core_version(),
        !args.empty
    );
    println!("uproot {} - type `help` for commands", core_version());

    let interactive = io::stdin().is_terminal();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("uproot> ");
            if io::stdout().flush().is_err() {
                break;
            }
        }

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(err)) => {
                eprintln!("error: {err}");
                break;
            }
            None => break,
        };

        match shell::run_line(&conn, &line) {
            Ok(shell::Flow::Continue) => {}
            Ok(shell::Flow::Quit) => break,
            Err(err) => println!("error: {err}"),
        }
    }

    info!("event=shell_stop module=cli status=ok");
    ExitCode::SUCCESS
}
