//! Jobseeker CLI - manage job seeker records

use anyhow::Context;
use clap::{Parser, Subcommand};
use jobseeker_core::config::Config;
use jobseeker_core::storage::{Database, DatabaseConfig};
use jobseeker_core::{
    JobSeeker, JobSeekerPatch, JobSeekerService, JobSeekerStore, Repository, SqliteJobSeekerStore,
};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "jobseeker")]
#[command(author, version, about = "Manage job seeker records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database file (overrides database.path from the config)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Store(StoreCommand),

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

/// Commands that need an open store
#[derive(Subcommand)]
enum StoreCommand {
    /// Register a new job seeker
    Add {
        /// Contact email
        #[arg(short, long)]
        email: String,
        /// Full name
        #[arg(short, long)]
        name: String,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Use this identifier instead of letting the store pick one
        #[arg(long)]
        id: Option<Uuid>,
        /// Store even if the email is already registered
        #[arg(long)]
        allow_duplicate: bool,
    },

    /// Show a job seeker by ID, or every job seeker with an email
    Show {
        /// Job seeker ID
        #[arg(required_unless_present = "email", conflicts_with = "email")]
        id: Option<Uuid>,
        #[arg(short, long)]
        email: Option<String>,
    },

    /// List all job seekers
    List,

    /// Update a job seeker
    Update {
        id: Uuid,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Delete a job seeker (no error if it does not exist)
    Delete { id: Uuid },

    /// Check whether an email is registered
    Exists { email: String },

    /// Count job seekers
    Count,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

/// Everything a store command needs
struct Session {
    db: Database,
    store: SqliteJobSeekerStore,
    format: OutputFormat,
    quiet: bool,
}

impl Session {
    async fn open(cli: &Cli, cancel: CancellationToken) -> anyhow::Result<Self> {
        let config = Config::load()?;

        let mut db_config = config.database.database_config();
        if let Some(path) = &cli.database {
            db_config.path = path.clone();
        }

        let db = open_database(db_config, &cancel).await?;
        let store = SqliteJobSeekerStore::from_database(&db)
            .with_settings(&config.store)
            .with_cancellation(cancel);

        Ok(Self {
            db,
            store,
            format: cli.format,
            quiet: cli.quiet,
        })
    }

    fn service(&self) -> JobSeekerService {
        JobSeekerService::new(Box::new(self.store.clone()))
    }
}

/// Open (and migrate) the database unless interrupted first
async fn open_database(config: DatabaseConfig, cancel: &CancellationToken) -> anyhow::Result<Database> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(anyhow::anyhow!("Interrupted while opening the database")),
        db = Database::new(config) => db,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jobseeker=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling storage operations");
            on_interrupt.cancel();
        }
    });

    match &cli.command {
        Commands::Config { action } => cmd_config(action, cli.quiet),
        Commands::Doctor => cmd_doctor(&cli, &cancel).await,
        Commands::Store(command) => {
            let session = Session::open(&cli, cancel).await?;
            let result = run_store_command(&session, command).await;
            session.db.close().await;
            result
        }
    }
}

async fn run_store_command(session: &Session, command: &StoreCommand) -> anyhow::Result<()> {
    match command {
        StoreCommand::Add {
            email,
            name,
            country,
            city,
            phone,
            id,
            allow_duplicate,
        } => {
            let mut seeker = JobSeeker::new(email, name);
            if let Some(id) = id {
                seeker = seeker.with_id(*id);
            }
            seeker.country = country.clone();
            seeker.city = city.clone();
            seeker.phone_number = phone.clone();
            cmd_add(session, seeker, *allow_duplicate).await
        }
        StoreCommand::Show { id, email } => cmd_show(session, *id, email.as_deref()).await,
        StoreCommand::List => cmd_list(session).await,
        StoreCommand::Update {
            id,
            email,
            name,
            country,
            city,
            phone,
        } => {
            let patch = JobSeekerPatch {
                email: email.clone(),
                full_name: name.clone(),
                country: country.clone(),
                city: city.clone(),
                phone_number: phone.clone(),
            };
            cmd_update(session, *id, patch).await
        }
        StoreCommand::Delete { id } => cmd_delete(session, *id).await,
        StoreCommand::Exists { email } => cmd_exists(session, email).await,
        StoreCommand::Count => cmd_count(session).await,
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

fn print_seeker(seeker: &JobSeeker) {
    println!("Job seeker: {}", seeker.full_name);
    println!("  ID: {}", seeker.id);
    println!("  Email: {}", seeker.email);
    if let Some(country) = &seeker.country {
        println!("  Country: {}", country);
    }
    if let Some(city) = &seeker.city {
        println!("  City: {}", city);
    }
    if let Some(phone) = &seeker.phone_number {
        println!("  Phone: {}", phone);
    }
    println!("  Created: {}", seeker.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Updated: {}", seeker.updated_at.format("%Y-%m-%d %H:%M:%S"));
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn cmd_add(session: &Session, seeker: JobSeeker, allow_duplicate: bool) -> anyhow::Result<()> {
    let saved = if allow_duplicate {
        if !seeker.is_new() && session.store.exists_by_id(&seeker.id).await? {
            return Err(anyhow::anyhow!(
                "A job seeker with ID '{}' already exists. Use `jobseeker update` to change it.",
                seeker.id
            ));
        }
        session.store.save(&seeker).await?
    } else {
        session.service().register(seeker).await?
    };

    match session.format {
        OutputFormat::Json => print_json(&saved)?,
        OutputFormat::Text if session.quiet => println!("{}", saved.id),
        OutputFormat::Text => {
            println!("Job seeker registered successfully!");
            println!("  ID: {}", saved.id);
            println!("  Email: {}", saved.email);
        }
    }
    Ok(())
}

async fn cmd_show(session: &Session, id: Option<Uuid>, email: Option<&str>) -> anyhow::Result<()> {
    let found = match (id, email) {
        (Some(id), _) => session.store.find_by_id(&id).await?.into_iter().collect(),
        (None, Some(email)) => session.store.find_by_email(email).await?,
        (None, None) => Vec::new(),
    };

    if found.is_empty() {
        let what = id
            .map(|id| id.to_string())
            .or_else(|| email.map(str::to_string))
            .unwrap_or_default();
        return Err(anyhow::anyhow!(
            "Job seeker '{}' not found. Run `jobseeker list` to see all job seekers.",
            what
        ));
    }

    match session.format {
        OutputFormat::Json if id.is_some() => print_json(&found[0])?,
        OutputFormat::Json => print_json(&found)?,
        OutputFormat::Text => {
            for seeker in &found {
                print_seeker(seeker);
            }
        }
    }
    Ok(())
}

async fn cmd_list(session: &Session) -> anyhow::Result<()> {
    let mut seekers = session.store.find_all().await?;
    seekers.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));

    if session.format == OutputFormat::Json {
        return print_json(&seekers);
    }

    if seekers.is_empty() {
        if !session.quiet {
            println!("No job seekers found.");
            println!("\nRegister one with: jobseeker add --email <email> --name <name>");
        }
        return Ok(());
    }

    if !session.quiet {
        println!("Job seekers:");
    }
    for s in seekers {
        println!("  {} - {} <{}>", &s.id.to_string()[..8], s.full_name, s.email);
    }
    Ok(())
}

async fn cmd_update(session: &Session, id: Uuid, patch: JobSeekerPatch) -> anyhow::Result<()> {
    if patch.is_empty() {
        return Err(anyhow::anyhow!(
            "Nothing to update. Pass at least one of --email, --name, --country, --city, --phone."
        ));
    }

    let updated = session
        .service()
        .update(id, patch)
        .await?
        .with_context(|| format!("Job seeker '{}' not found", id))?;

    match session.format {
        OutputFormat::Json => print_json(&updated)?,
        OutputFormat::Text if session.quiet => {}
        OutputFormat::Text => {
            println!("Job seeker '{}' updated.", id);
            print_seeker(&updated);
        }
    }
    Ok(())
}

async fn cmd_delete(session: &Session, id: Uuid) -> anyhow::Result<()> {
    let existed = session.service().remove(id).await?;
    debug!(id = %id, existed, "Delete finished");

    match session.format {
        OutputFormat::Json => print_json(&serde_json::json!({ "id": id, "deleted": existed }))?,
        OutputFormat::Text if session.quiet => {}
        OutputFormat::Text if existed => println!("Job seeker '{}' deleted.", id),
        OutputFormat::Text => println!("Job seeker '{}' did not exist; nothing to delete.", id),
    }
    Ok(())
}

async fn cmd_exists(session: &Session, email: &str) -> anyhow::Result<()> {
    let exists = session.store.exists_by_email(email).await?;

    match session.format {
        OutputFormat::Json => print_json(&serde_json::json!({ "email": email, "exists": exists }))?,
        OutputFormat::Text => println!("{}", exists),
    }
    Ok(())
}

async fn cmd_count(session: &Session) -> anyhow::Result<()> {
    let count = session.store.count().await?;

    match session.format {
        OutputFormat::Json => print_json(&serde_json::json!({ "count": count }))?,
        OutputFormat::Text => println!("{}", count),
    }
    Ok(())
}

fn cmd_config(action: &ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(key, value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path()?.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(cli: &Cli, cancel: &CancellationToken) -> anyhow::Result<()> {
    let quiet = cli.quiet;
    if !quiet {
        println!("Jobseeker Health Check");
        println!("======================");
        println!();
    }

    let config = match Config::load() {
        Ok(config) => {
            if !quiet {
                println!("[OK] Configuration: Valid");
            }
            config
        }
        Err(e) => {
            if !quiet {
                println!("[!!] Configuration: Error - {}", e);
            }
            return Err(e.context("Health check failed"));
        }
    };

    let mut db_config = config.database.database_config();
    if let Some(path) = &cli.database {
        db_config.path = path.clone();
    }
    let path = db_config.path.clone();

    let db = match open_database(db_config, cancel).await {
        Ok(db) => db,
        Err(e) => {
            if !quiet {
                println!("[!!] Database: {} - {:#}", path.display(), e);
            }
            return Err(e.context("Health check failed"));
        }
    };

    let mut all_ok = true;

    match db.health_check().await {
        Ok(()) => {
            if !quiet {
                println!("[OK] Database: {}", path.display());
            }
        }
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Database: {:#}", e);
            }
        }
    }

    match db.migration_status().await {
        Ok(status) if !status.needs_migration => {
            if !quiet {
                println!("[OK] Schema: version {}", status.current_version);
            }
        }
        Ok(status) => {
            all_ok = false;
            if !quiet {
                println!(
                    "[!!] Schema: version {} (expected {})",
                    status.current_version, status.target_version
                );
            }
        }
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Schema: {:#}", e);
            }
        }
    }

    if !quiet {
        println!(
            "[OK] Store: ids={}, email_match={}, timeout_ms={}",
            config.store.id_strategy.as_str(),
            config.store.email_match.as_str(),
            config.store.query_timeout_ms
        );
    }

    db.close().await;

    if all_ok {
        if !quiet {
            println!();
            println!("All checks passed.");
        }
        Ok(())
    } else {
        Err(anyhow::anyhow!("Health check failed"))
    }
}
