/// Version injected at compile time via NETORCA_PROVIDER_VERSION env var (set
/// by CI/CD), or "dev" for local builds.
pub const VERSION: &str = match option_env!("NETORCA_PROVIDER_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use netorca_provider::resource::dispatch::{CHANGE_INSTANCES, SERVICE_ITEMS};
use netorca_provider::resource::{self, AttrValue, NetOrcaProvider};
use serde_json::Value;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Env var overriding --log-level with a full tracing filter directive
const LOG_FILTER_ENV: &str = "NETORCA_LOG";

/// NetOrca provider: read and manage NetOrca change instances and service items
#[derive(Parser, Debug)]
#[command(name = "netorca-provider", version, about, long_about = None)]
struct Args {
    /// NetOrca API URL (falls back to NETORCA_URL, then the config file)
    #[arg(long, global = true)]
    url: Option<String>,

    /// NetOrca API key (falls back to NETORCA_API_KEY, then the config file)
    #[arg(long, global = true)]
    apikey: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the provider, resource and data source schemas
    Schema,
    /// Read the change instances data source
    ChangeInstances(DataSourceArgs),
    /// Read the service items data source
    ServiceItems(DataSourceArgs),
    /// Manage a change instance resource
    #[command(subcommand)]
    ChangeInstance(ChangeInstanceCommand),
}

#[derive(ClapArgs, Debug)]
struct DataSourceArgs {
    /// Point of view (consumer|serviceowner)
    #[arg(long)]
    pov: String,

    /// Filter as key=value; JSON values are typed, anything else is a string
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, AttrValue)>,
}

#[derive(ClapArgs, Debug)]
struct RecordArgs {
    #[arg(long)]
    id: i64,

    /// Point of view (consumer|serviceowner)
    #[arg(long)]
    pov: String,
}

#[derive(ClapArgs, Debug)]
struct ApplyArgs {
    #[command(flatten)]
    record: RecordArgs,

    /// Target state, e.g. APPROVED|ERROR|COMPLETED
    #[arg(long)]
    state: Option<String>,

    #[arg(long)]
    description: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ChangeInstanceCommand {
    /// Adopt an existing change instance by applying state and payload
    Create {
        #[command(flatten)]
        apply: ApplyArgs,

        /// JSON object attached to the change instance
        #[arg(long)]
        deployed_item: String,
    },
    Read(RecordArgs),
    /// Apply state and payload when they differ from the live record
    Update {
        #[command(flatten)]
        apply: ApplyArgs,

        /// JSON object attached to the change instance; kept as is when omitted
        #[arg(long)]
        deployed_item: Option<String>,
    },
    /// Forget a change instance (nothing is deleted remotely)
    Delete(RecordArgs),
    /// Import by `{pov}/{id}`
    Import { id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn parse_filter(s: &str) -> std::result::Result<(String, AttrValue), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("missing filter name in '{}'", s));
    }

    let value = serde_json::from_str::<Value>(raw)
        .map(|v| AttrValue::from_json(&v))
        .unwrap_or_else(|_| AttrValue::string(raw));
    Ok((key.to_string(), value))
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let override_filter = std::env::var(LOG_FILTER_ENV).ok().filter(|v| !v.is_empty());

    let filter = match (override_filter, level.to_tracing_level()) {
        (Some(directive), _) => EnvFilter::try_new(&directive)
            .with_context(|| format!("Invalid {} value: {}", LOG_FILTER_ENV, directive))?,
        (None, Some(tracing_level)) => EnvFilter::new(tracing_level.to_string()),
        (None, None) => return Ok(None),
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("netorca-provider {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("netorca").join("netorca-provider.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".netorca").join("netorca-provider.log");
    }
    PathBuf::from("netorca-provider.log")
}

fn data_source_config(args: DataSourceArgs) -> AttrValue {
    AttrValue::object([
        ("pov", AttrValue::String(args.pov)),
        ("filters", AttrValue::object(args.filters)),
    ])
}

/// Attributes naming a record; the payload is never sent by read or delete
fn record_attr(args: RecordArgs) -> AttrValue {
    AttrValue::object([
        ("id", AttrValue::Int64(args.id)),
        ("pov", AttrValue::String(args.pov)),
        ("deployed_item", AttrValue::string("{}")),
    ])
}

fn change_instance_attr(args: ApplyArgs, deployed_item: String) -> AttrValue {
    AttrValue::object([
        ("id", AttrValue::Int64(args.record.id)),
        ("pov", AttrValue::String(args.record.pov)),
        ("state", AttrValue::from(args.state)),
        ("deployed_item", AttrValue::String(deployed_item)),
        ("description", AttrValue::from(args.description)),
    ])
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    if let Command::Schema = args.command {
        return print_json(resource::get_registry());
    }

    let provider_block = AttrValue::object([
        ("url", AttrValue::from(args.url)),
        ("apikey", AttrValue::from(args.apikey)),
    ]);
    let provider = NetOrcaProvider::configure(&provider_block)
        .context("Failed to configure the NetOrca provider")?;

    match args.command {
        Command::Schema => Ok(()),
        Command::ChangeInstances(ds) => {
            let state = provider
                .read_data_source(CHANGE_INSTANCES, &data_source_config(ds))
                .await
                .context("Unable to read change instances")?;
            print_json(&state)
        }
        Command::ServiceItems(ds) => {
            let state = provider
                .read_data_source(SERVICE_ITEMS, &data_source_config(ds))
                .await
                .context("Unable to read service items")?;
            print_json(&state)
        }
        Command::ChangeInstance(cmd) => run_change_instance(&provider, cmd).await,
    }
}

async fn run_change_instance(provider: &NetOrcaProvider, cmd: ChangeInstanceCommand) -> Result<()> {
    match cmd {
        ChangeInstanceCommand::Create { apply, deployed_item } => {
            let state = provider
                .create_resource(CHANGE_INSTANCES, &change_instance_attr(apply, deployed_item))
                .await
                .context("Unable to create change instance")?;
            print_json(&state)
        }
        ChangeInstanceCommand::Read(record) => {
            let state = provider
                .read_resource(CHANGE_INSTANCES, &record_attr(record))
                .await
                .context("Unable to read change instance")?;
            print_json(&state)
        }
        ChangeInstanceCommand::Update {
            mut apply,
            deployed_item,
        } => {
            let lookup = RecordArgs {
                id: apply.record.id,
                pov: apply.record.pov.clone(),
            };
            let prior = provider
                .read_resource(CHANGE_INSTANCES, &record_attr(lookup))
                .await
                .context("Unable to read change instance")?;

            // unspecified fields keep their live values
            let live = |name: &str| {
                prior
                    .get(name)
                    .and_then(AttrValue::as_str)
                    .map(str::to_string)
            };
            if apply.state.is_none() {
                apply.state = live("state");
            }
            let deployed_item = deployed_item
                .or_else(|| live("deployed_item"))
                .unwrap_or_else(|| "{}".to_string());

            let plan = change_instance_attr(apply, deployed_item);
            let state = provider
                .update_resource(CHANGE_INSTANCES, &plan, &prior)
                .await
                .context("Unable to update change instance")?;
            print_json(&state)
        }
        ChangeInstanceCommand::Delete(record) => {
            provider
                .delete_resource(CHANGE_INSTANCES, &record_attr(record))
                .await
                .context("Unable to delete change instance")?;
            Ok(())
        }
        ChangeInstanceCommand::Import { id } => {
            let state = provider
                .import_resource(CHANGE_INSTANCES, &id)
                .await
                .context("Unable to import change instance")?;
            print_json(&state)
        }
    }
}
