//! Operator command line for the staff directory.
//!
//! Every command that reads or changes people runs as a manager identified
//! by `--as EMAIL`, so the same access rules apply as for any other caller.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use staffdesk_lib::db::{DbEmployee, StaffDb};
use staffdesk_lib::services::{dashboard, employees, roster};
use staffdesk_lib::state::load_config;
use staffdesk_lib::AppState;

#[derive(Parser, Debug)]
#[command(name = "staffdesk", version, about = "Employee directory and roster import")]
struct Cli {
    /// Config file (defaults to ~/.staffdesk/config.json)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database and seed the root manager when empty
    Init,
    /// Import employees from an .xlsx, .xls or .csv roster
    Import {
        file: PathBuf,
        /// Email of the importing manager
        #[arg(long = "as", value_name = "EMAIL")]
        as_email: String,
    },
    /// Link employees to managers named in a roster
    Repair {
        file: PathBuf,
        #[arg(long = "as", value_name = "EMAIL")]
        as_email: String,
    },
    /// Print the org chart visible to an employee as JSON
    Hierarchy {
        #[arg(long = "as", value_name = "EMAIL")]
        as_email: String,
    },
    /// Print dashboard counts for an employee's scope as JSON
    Analytics {
        #[arg(long = "as", value_name = "EMAIL")]
        as_email: String,
    },
    /// Write the roster import template
    Template {
        #[arg(long = "as", value_name = "EMAIL")]
        as_email: String,
        /// Output file (defaults to stdout)
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
}

fn requester(db: &StaffDb, email: &str) -> Result<DbEmployee> {
    match db.find_by_email(email)? {
        Some(emp) => Ok(emp),
        None => bail!("No employee with email {email}"),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_output(out: Option<&Path>, content: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{content}");
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).map_err(anyhow::Error::msg)?;
    let state = AppState::open(config).context("Failed to open database")?;
    state.seed_if_empty()?;

    match cli.cmd {
        Command::Init => {
            let db = state.db.lock();
            println!("{} employee(s) in directory", db.count_employees()?);
        }
        Command::Import { file, as_email } => {
            let hash = state.default_password_hash()?;
            let db = state.db.lock();
            let me = requester(&db, &as_email)?;
            let result = roster::import_roster(&db, me.id, &file, &hash)?;

            if let Some(error) = &result.error {
                bail!("{error}");
            }
            println!(
                "Imported {} employee(s), skipped {} duplicate(s)",
                result.count, result.skipped
            );
            let limit = state.config.import_error_display_limit;
            for warning in result.errors.iter().take(limit) {
                println!("  {warning}");
            }
            if result.errors.len() > limit {
                println!("  ... and {} more", result.errors.len() - limit);
            }
        }
        Command::Repair { file, as_email } => {
            let db = state.db.lock();
            let me = requester(&db, &as_email)?;
            let report = roster::repair_roster(&db, me.id, &file)?;
            println!(
                "{} row(s) seen, {} link(s) updated, {} manager(s) promoted",
                report.rows_seen, report.links_updated, report.managers_promoted
            );
            for warning in &report.warnings {
                println!("  {warning}");
            }
        }
        Command::Hierarchy { as_email } => {
            let db = state.db.lock();
            let me = requester(&db, &as_email)?;
            print_json(&employees::hierarchy(&db, me.id)?)?;
        }
        Command::Analytics { as_email } => {
            let db = state.db.lock();
            let me = requester(&db, &as_email)?;
            print_json(&dashboard::analytics(&db, me.id)?)?;
        }
        Command::Template { as_email, out } => {
            let db = state.db.lock();
            let me = requester(&db, &as_email)?;
            let csv = roster::download_template(&db, me.id)?;
            write_output(out.as_deref(), &csv)?;
        }
    }
    Ok(())
}
