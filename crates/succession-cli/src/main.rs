mod display;

use std::path::PathBuf;

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use succession_core::state::DEFAULT_PAGE_SIZE;
use succession_core::view::ALL_DEPARTMENTS;
use succession_core::{Action, AppState, PlanInput, TxStatus};
use succession_ledger::LedgerClient;
use succession_store::{ContractReader, ContractWriter, FileLedger, RecordStore};

#[derive(Parser)]
#[command(
    name = "succession",
    version,
    about = "Succession planning records kept on a contract ledger"
)]
struct Cli {
    /// Ledger gateway node, e.g. http://localhost:8545
    #[arg(long, env = "SUCCESSION_GATEWAY_URL", global = true, conflicts_with = "ledger_file")]
    gateway_url: Option<String>,

    /// Local JSON ledger file
    #[arg(long, env = "SUCCESSION_LEDGER_FILE", global = true)]
    ledger_file: Option<PathBuf>,

    /// Signer token for writes through the gateway node
    #[arg(long, env = "SUCCESSION_SIGNER_TOKEN", global = true, hide_env_values = true)]
    signer_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Probe whether the contract is available
    Status,
    /// List plans, newest first
    List {
        /// Case-insensitive match on position or candidate id
        #[arg(long, default_value = "")]
        search: String,
        /// Exact department, or "all"
        #[arg(long, default_value = ALL_DEPARTMENTS)]
        department: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    /// Dashboard summary: counts, readiness, departments
    Stats,
    /// Department filter values accepted by `list --department`
    Departments,
    /// Submit a new plan
    Create {
        #[arg(long)]
        position: String,
        #[arg(long)]
        candidate_id: String,
        #[arg(long, default_value = "")]
        department: String,
        /// Performance score, 0-100
        #[arg(long)]
        score: String,
    },
    /// Show one plan by id
    Show { id: String },
}

impl Cli {
    fn reader(&self) -> anyhow::Result<Box<dyn ContractReader>> {
        if let Some(url) = &self.gateway_url {
            return Ok(Box::new(LedgerClient::new(url.clone())));
        }
        if let Some(path) = &self.ledger_file {
            return Ok(Box::new(FileLedger::open(path)));
        }
        bail!("no ledger configured: pass --gateway-url or --ledger-file")
    }

    /// A signer-backed gateway and the account it acts for.
    fn writer(&self) -> anyhow::Result<(Box<dyn ContractWriter>, String)> {
        if let Some(url) = &self.gateway_url {
            let token = self
                .signer_token
                .clone()
                .context("writing through a gateway node needs --signer-token")?;
            let client = LedgerClient::new(url.clone()).with_signer(token);
            return Ok((Box::new(client), format!("signer@{url}")));
        }
        if let Some(path) = &self.ledger_file {
            let account = format!("local:{}", path.display());
            return Ok((Box::new(FileLedger::open(path)), account));
        }
        bail!("no ledger configured: pass --gateway-url or --ledger-file")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    tracing::info!("succession v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match &cli.command {
        Command::Status => status(&cli).await,
        Command::List {
            search,
            department,
            page,
            page_size,
        } => {
            let mut state = load(&cli, *page_size).await?;
            check_department(&state, department)?;
            state.apply(Action::SearchChanged(search.clone()));
            state.apply(Action::DepartmentChanged(department.clone()));
            state.apply(Action::PageSelected(*page));
            print!(
                "{}",
                display::render_plan_table(&state.page_records(), state.page, state.total_pages())
            );
            Ok(())
        }
        Command::Stats => {
            let state = load(&cli, DEFAULT_PAGE_SIZE).await?;
            print!("{}", display::render_dashboard(&state.stats()));
            Ok(())
        }
        Command::Departments => {
            let state = load(&cli, DEFAULT_PAGE_SIZE).await?;
            print!("{}", display::render_department_options(&state.department_options()));
            Ok(())
        }
        Command::Create {
            position,
            candidate_id,
            department,
            score,
        } => {
            let form = PlanInput {
                position: position.clone(),
                candidate_id: candidate_id.clone(),
                department: department.clone(),
                score: score.clone(),
            };
            create(&cli, form).await
        }
        Command::Show { id } => {
            let store = RecordStore::new(cli.reader()?);
            let record = store
                .get(id)
                .await
                .with_context(|| format!("reading plan {id}"))?;
            match record {
                Some(record) => {
                    print!("{}", display::render_plan_card(&record));
                    Ok(())
                }
                None => bail!("no plan with id {id}"),
            }
        }
    }
}

async fn status(cli: &Cli) -> anyhow::Result<()> {
    let store = RecordStore::new(cli.reader()?);
    let mut state = AppState::default();
    let at = Utc::now();
    match store.gateway().is_available().await {
        Ok(available) => state.apply(Action::AvailabilityChecked { available, at }),
        Err(e) => {
            tracing::warn!(error = %e, "availability probe failed");
            state.apply(Action::AvailabilityCheckFailed { at });
        }
    }
    finish(&state)
}

async fn load(cli: &Cli, page_size: usize) -> anyhow::Result<AppState> {
    let store = RecordStore::new(cli.reader()?);
    let mut state = AppState::new(page_size);
    state.apply(Action::RefreshStarted);
    match store.list_all().await {
        Ok(records) => state.apply(Action::RecordsLoaded(records)),
        Err(e) => {
            state.apply(Action::RefreshFailed {
                reason: e.to_string(),
            });
            bail!("loading plans: {e}");
        }
    }
    Ok(state)
}

async fn create(cli: &Cli, form: PlanInput) -> anyhow::Result<()> {
    // Reject an incomplete form before touching the signer.
    form.validate()?;

    let (gateway, account) = cli.writer()?;
    let store = RecordStore::new(gateway);
    let mut state = AppState::default();
    state.apply(Action::Connected { account });
    state.apply(Action::OpenCreateForm);
    state.apply(Action::FormEdited(form));
    state.apply(Action::SubmitStarted { at: Utc::now() });
    if let Some(banner) = &state.banner {
        eprintln!("{}", display::render_banner(banner));
    }

    match store.create(&state.form).await {
        Ok(record) => {
            print!("{}", display::render_plan_card(&record));
            state.apply(Action::SubmitSucceeded {
                record,
                at: Utc::now(),
            });
        }
        Err(e) => state.apply(Action::SubmitFailed {
            message: e.to_string(),
            at: Utc::now(),
        }),
    }
    finish(&state)
}

fn check_department(state: &AppState, department: &str) -> anyhow::Result<()> {
    let options = state.department_options();
    if options.iter().any(|d| d == department) {
        return Ok(());
    }
    bail!(
        "unknown department {department:?}; choose one of: {}",
        options.join(", ")
    )
}

/// Print the final banner; an error banner is the process's error.
fn finish(state: &AppState) -> anyhow::Result<()> {
    let Some(banner) = &state.banner else {
        return Ok(());
    };
    if banner.status == TxStatus::Error {
        bail!("{}", banner.message);
    }
    eprintln!("{}", display::render_banner(banner));
    Ok(())
}
