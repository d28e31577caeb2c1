//! Non-interactive command line front end over [`ExpenseSession`].

pub mod output;

use std::{path::PathBuf, sync::Arc};

use chrono::{NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;

use crate::{
    config::{BackendKind, Config, ConfigError, ConfigManager},
    core::{
        services::{ServiceError, SummaryService},
        time::{Clock, SystemClock},
        ExpenseSession,
    },
    currency::CurrencyFormat,
    domain::TransactionKind,
    errors::LedgerError,
    storage::{open_backend, ExpenseBackend},
};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Input(String),
}

/// Track income and expenses and print summaries.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Use the in-memory demo store regardless of configuration.
    #[arg(long, global = true)]
    pub demo: bool,

    /// Data directory; defaults to `$EXPENSE_CORE_HOME` or `~/.expense_core`.
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Account email used to sign in (registered on first use).
    #[arg(long, global = true)]
    pub email: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Balance, income and expense totals.
    Summary,
    /// Expense totals per category.
    Categories,
    /// Monthly expense totals for the trailing window.
    Trend {
        #[arg(long)]
        months: Option<usize>,
    },
    /// Transactions, newest first.
    List,
    /// Record a transaction.
    Add {
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long)]
        category: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        note: Option<String>,
        /// Transaction date as YYYY-MM-DD; defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete a transaction by id.
    Delete { id: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindArg {
    Income,
    Expense,
}

impl From<KindArg> for TransactionKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Income => TransactionKind::Income,
            KindArg::Expense => TransactionKind::Expense,
        }
    }
}

pub fn run_cli() -> Result<(), CliError> {
    run(Args::parse())
}

pub fn run(args: Args) -> Result<(), CliError> {
    let manager = match &args.home {
        Some(home) => ConfigManager::with_base_dir(home.clone())?,
        None => ConfigManager::new()?,
    };
    let mut config = manager.load()?;
    if args.demo {
        config.backend = BackendKind::Demo;
    }
    if config.data_dir.is_none() {
        config.data_dir = args.home.clone();
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let backend = open_backend(&config, Arc::clone(&clock))?;
    ensure_signed_in(backend.as_ref(), args.email.as_deref())?;
    let mut session = ExpenseSession::open(backend, &config)?;
    let format = CurrencyFormat::for_config(&config);
    execute(&mut session, args.command, &config, &format, clock.as_ref())
}

fn ensure_signed_in(backend: &dyn ExpenseBackend, email: Option<&str>) -> Result<(), CliError> {
    let Some(email) = email else {
        if backend.current_user().is_none() {
            return Err(CliError::Input(
                "no user is signed in; pass --email to choose an account".into(),
            ));
        }
        return Ok(());
    };
    match backend.sign_in(email, "") {
        Ok(_) => Ok(()),
        Err(LedgerError::Auth(_)) => backend.sign_up(email, "").map(|_| ()).map_err(Into::into),
        Err(err) => Err(err.into()),
    }
}

fn execute(
    session: &mut ExpenseSession,
    command: Command,
    config: &Config,
    format: &CurrencyFormat,
    clock: &dyn Clock,
) -> Result<(), CliError> {
    match command {
        Command::Summary => {
            if let Some(user) = session.user() {
                output::info(format!("Signed in as {}", user.name()));
            }
            let report = session.stats(clock.today())?;
            output::print_report(&report, format);
        }
        Command::Categories => {
            output::section("Expenses by category");
            let grouped = SummaryService::group_expenses_by_category(session.transactions());
            for line in output::category_lines(&grouped, format) {
                output::info(line);
            }
        }
        Command::Trend { months } => {
            let months = months.unwrap_or(config.trend_months);
            output::section(&format!("Expenses, last {months} months"));
            let series =
                SummaryService::monthly_expense_series(session.transactions(), months, clock.today())?;
            for line in output::trend_lines(&series, format) {
                output::info(line);
            }
        }
        Command::List => {
            if session.transactions().is_empty() {
                output::info("No transactions yet.");
            }
            for txn in session.transactions() {
                output::info(output::transaction_line(txn, format));
            }
        }
        Command::Add {
            kind,
            category,
            amount,
            note,
            date,
        } => {
            let occurred_at = match date {
                Some(date) => date
                    .and_hms_opt(0, 0, 0)
                    .map(|naive| Utc.from_utc_datetime(&naive))
                    .ok_or_else(|| CliError::Input(format!("invalid date {date}")))?,
                None => clock.now(),
            };
            let mut draft = session.draft(kind.into(), category, amount, occurred_at)?;
            draft.note = note;
            let stored = session.add(draft)?;
            output::success(format!("Added {}", stored.id));
        }
        Command::Delete { id } => {
            session.delete(&id)?;
            output::success(format!("Deleted {id}"));
        }
    }
    Ok(())
}
