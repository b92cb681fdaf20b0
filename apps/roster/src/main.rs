mod config;
mod render;
mod seed;
mod shell;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use platform_obs::{ObsConfig, init_tracing};
use products_hr::EmployeeStore;
use tracing::info;

use crate::{config::RosterConfig, shell::Shell};

#[derive(Parser, Debug)]
#[command(name = "roster", version, about = "In-memory employee roster")]
struct Cli {
    /// JSON seed file read once at startup (overrides ROSTER_SEED_FILE).
    #[arg(long, value_name = "FILE", global = true)]
    seed: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read roster commands from stdin (default).
    Shell,
    /// Print a one-shot report over the seeded roster.
    Report {
        #[arg(value_enum, default_value_t = ReportKind::All)]
        kind: ReportKind,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ReportKind {
    All,
    Top,
    Averages,
}

fn main() -> Result<()> {
    init_tracing(ObsConfig::default())?;
    let cli = Cli::parse();
    let mut config = RosterConfig::load()?;
    if let Some(path) = cli.seed {
        config.seed_file = Some(path);
    }
    let store = seed::load_store(config.seed_file.as_deref())?;

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => run_shell(store, config),
        Command::Report { kind } => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_report(&mut out, &store, &config, kind)?;
            out.flush().context("failed to flush report")
        }
    }
}

fn run_shell(store: EmployeeStore<u32>, config: RosterConfig) -> Result<()> {
    info!(employees = store.len(), "roster shell ready");
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(store, config, stdout.lock());
    shell.run(stdin.lock())?;
    info!("roster shell closed");
    Ok(())
}

fn write_report<W: Write>(
    out: &mut W,
    store: &EmployeeStore<u32>,
    config: &RosterConfig,
    kind: ReportKind,
) -> Result<()> {
    match kind {
        ReportKind::All => {
            let mut all = store.get_all();
            all.sort_by_key(|employee| *employee.id());
            render::write_rows(out, &all, "No employees on the roster")?;
            let payroll: f64 = store.iter().map(|employee| employee.salary()).sum();
            writeln!(
                out,
                "{} employees, payroll {}",
                store.len(),
                render::format_currency(payroll)
            )?;
        }
        ReportKind::Top => {
            let top = store.top_paid(config.top_paid);
            render::write_rows(out, &top, "No employees on the roster")?;
        }
        ReportKind::Averages => {
            for department in shell::known_departments(store, config) {
                let average = store.average_salary(&department);
                writeln!(out, "{}", render::average_line(&department, average))?;
            }
        }
    }
    Ok(())
}
