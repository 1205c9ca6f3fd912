//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{self, CsvAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{DataSource, data_source, validate_config};
use crate::domain::error::{TradesimError, ValidationError};
use crate::domain::period::{self, Period, QuoteRow};
use crate::domain::simulation::{self, SimulationRequest, SimulationResult};
use crate::ports::config_port::ConfigPort;
use crate::ports::quote_port::QuoteSeriesProvider;

#[derive(Parser, Debug)]
#[command(name = "tradesim", about = "Buy-and-hold trade simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate buying on one date and selling on another
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        /// Buy date (YYYY-MM-DD)
        #[arg(long)]
        buy: NaiveDate,
        /// Sell date (YYYY-MM-DD)
        #[arg(long)]
        sell: NaiveDate,
        /// Amount invested; defaults to [simulation] principal
        #[arg(short, long)]
        principal: Option<f64>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
        /// Write the daily valuation trajectory to a CSV file
        #[arg(long)]
        trajectory: Option<PathBuf>,
    },
    /// Print the dashboard quote window as CSV
    Quotes {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        to: NaiveDate,
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Window length: 10y, 5y, 1y, 3m, 1m or 1w
        #[arg(long, default_value = "10y")]
        unit: Period,
    },
    /// Show the stored data range
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Load a CSV quote file into the SQLite store
    Import {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Start the HTTP API
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Output options for [`run_simulation`].
#[derive(Debug, Clone, Default)]
pub struct SimulationOutput {
    pub json: bool,
    pub trajectory: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Simulate {
            config,
            buy,
            sell,
            principal,
            json,
            trajectory,
        } => run_simulate(
            &config,
            buy,
            sell,
            principal,
            &SimulationOutput { json, trajectory },
        ),
        Command::Quotes {
            config,
            to,
            from,
            unit,
        } => run_quotes(&config, to, from, unit),
        Command::Info { config } => run_info(&config),
        Command::Import { config, csv } => run_import(&config, &csv),
        Command::Validate { config } => run_validate(&config),
        Command::Serve { config } => run_serve(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Load and validate a configuration file.
pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TradesimError> {
    eprintln!("Loading config from {}", path.display());
    let config = FileConfigAdapter::from_file(path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Build the quote provider selected by `[data] source`.
pub fn open_provider(
    config: &dyn ConfigPort,
) -> Result<Box<dyn QuoteSeriesProvider + Send + Sync>, TradesimError> {
    match data_source(config)? {
        DataSource::Csv => {
            let path = config
                .get_string("csv", "path")
                .ok_or_else(|| TradesimError::ConfigMissing {
                    section: "csv".into(),
                    key: "path".into(),
                })?;
            Ok(Box::new(CsvAdapter::new(PathBuf::from(path.trim()))))
        }
        DataSource::Sqlite => open_sqlite(config),
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(
    config: &dyn ConfigPort,
) -> Result<Box<dyn QuoteSeriesProvider + Send + Sync>, TradesimError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;
    Ok(Box::new(SqliteAdapter::from_config(config)?))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(
    _config: &dyn ConfigPort,
) -> Result<Box<dyn QuoteSeriesProvider + Send + Sync>, TradesimError> {
    Err(sqlite_unavailable())
}

#[cfg(not(feature = "sqlite"))]
fn sqlite_unavailable() -> TradesimError {
    TradesimError::ConfigInvalid {
        section: "data".into(),
        key: "source".into(),
        reason: "built without the sqlite feature".into(),
    }
}

/// Principal from the command line, falling back to `[simulation] principal`.
pub fn resolve_principal(
    principal: Option<f64>,
    config: &dyn ConfigPort,
) -> Result<f64, ValidationError> {
    if let Some(p) = principal {
        return Ok(p);
    }
    match config.get_string("simulation", "principal") {
        Some(_) => Ok(config.get_double("simulation", "principal", f64::NAN)),
        None => Err(ValidationError::MissingField("principal")),
    }
}

fn run_simulate(
    config_path: &Path,
    buy: NaiveDate,
    sell: NaiveDate,
    principal: Option<f64>,
    output: &SimulationOutput,
) -> Result<(), TradesimError> {
    let config = load_config(config_path)?;
    let principal = resolve_principal(principal, &config)?;
    let request = SimulationRequest::new(buy, sell, principal);
    // reject before the provider is even opened
    request.validate()?;

    let provider = open_provider(&config)?;
    let result = run_simulation(provider.as_ref(), &request, output)?;
    if output.json {
        let json = serde_json::to_string_pretty(&result).map_err(io::Error::other)?;
        println!("{json}");
    } else {
        print!("{}", render_summary(&request, &result));
    }
    Ok(())
}

/// Simulate against `provider` and write the trajectory file if requested.
pub fn run_simulation(
    provider: &dyn QuoteSeriesProvider,
    request: &SimulationRequest,
    output: &SimulationOutput,
) -> Result<SimulationResult, TradesimError> {
    eprintln!(
        "Simulating {} -> {} with principal {}",
        request.buy_date, request.sell_date, request.principal
    );
    let result = simulation::simulate(provider, request)?;

    if let Some(path) = &output.trajectory {
        csv_adapter::write_trajectory(path, &result.valuation_trajectory)?;
        eprintln!(
            "Trajectory ({} days) written to: {}",
            result.valuation_trajectory.len(),
            path.display()
        );
    }
    Ok(result)
}

pub fn render_summary(request: &SimulationRequest, result: &SimulationResult) -> String {
    let sign = if result.profit_loss >= 0.0 { "+" } else { "" };
    let mut out = String::new();
    out.push_str("=== Simulation Result ===\n");
    out.push_str(&format!(
        "Period:           {} to {}\n",
        request.buy_date, request.sell_date
    ));
    out.push_str(&format!("Principal:        {:.2}\n", result.principal));
    out.push_str(&format!("Entry Price:      {:.2}\n", result.entry_price));
    out.push_str(&format!("Exit Price:       {:.2}\n", result.exit_price));
    out.push_str(&format!("Quantity:         {:.4}\n", result.quantity_purchased));
    out.push_str(&format!("Final Value:      {:.2}\n", result.final_value));
    out.push_str(&format!(
        "Profit/Loss:      {}{:.2}\n",
        sign, result.profit_loss
    ));
    out.push_str(&format!(
        "Yield:            {}{:.2}%\n",
        sign, result.yield_percent
    ));
    out.push_str(&format!(
        "Trading Days:     {}\n",
        result.valuation_trajectory.len()
    ));
    out
}

fn run_quotes(
    config_path: &Path,
    to: NaiveDate,
    from: Option<NaiveDate>,
    unit: Period,
) -> Result<(), TradesimError> {
    let config = load_config(config_path)?;
    let provider = open_provider(&config)?;
    let rows = period::fetch_window(provider.as_ref(), to, unit, from)?;
    eprintln!("{} rows ({} window ending {})", rows.len(), unit, to);
    write_quote_rows(io::stdout().lock(), &rows)
}

/// Write dashboard rows as CSV with a header.
pub fn write_quote_rows<W: Write>(writer: W, rows: &[QuoteRow]) -> Result<(), TradesimError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row).map_err(io::Error::from)?;
    }
    wtr.flush()?;
    Ok(())
}

fn run_info(config_path: &Path) -> Result<(), TradesimError> {
    let config = load_config(config_path)?;
    let provider = open_provider(&config)?;
    match provider.data_range()? {
        Some((min, max, count)) => println!("{count} quotes, {min} to {max}"),
        None => eprintln!("no data found"),
    }
    Ok(())
}

#[cfg(feature = "sqlite")]
fn run_import(config_path: &Path, csv_path: &Path) -> Result<(), TradesimError> {
    let config = load_config(config_path)?;
    let count = import_csv(&config, csv_path)?;
    eprintln!("Imported {} quotes from {}", count, csv_path.display());
    Ok(())
}

/// Load every quote in `csv_path` into the configured SQLite store and
/// return how many rows were written. Refused unless `[data] source` is
/// `sqlite`.
#[cfg(feature = "sqlite")]
pub fn import_csv(config: &dyn ConfigPort, csv_path: &Path) -> Result<usize, TradesimError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;

    if data_source(config)? != DataSource::Sqlite {
        return Err(TradesimError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: "import requires source = sqlite".into(),
        });
    }

    let quotes = CsvAdapter::new(csv_path.to_path_buf()).read_all()?;
    let store = SqliteAdapter::from_config(config)?;
    store.initialize_schema()?;
    store.insert_quotes(&quotes)
}

#[cfg(not(feature = "sqlite"))]
fn run_import(_config_path: &Path, _csv_path: &Path) -> Result<(), TradesimError> {
    Err(sqlite_unavailable())
}

fn run_validate(config_path: &Path) -> Result<(), TradesimError> {
    let config = load_config(config_path)?;
    let source = data_source(&config)?;
    eprintln!("Data source: {:?}", source);
    eprintln!("Configuration is valid.");
    Ok(())
}

#[cfg(feature = "web")]
fn run_serve(config_path: &Path) -> Result<(), TradesimError> {
    use crate::adapters::web::{AppState, build_router};
    use std::net::SocketAddr;
    use std::sync::Arc;

    let config = load_config(config_path)?;
    let provider: Arc<dyn QuoteSeriesProvider + Send + Sync> = Arc::from(open_provider(&config)?);

    let listen = config
        .get_string("web", "listen")
        .unwrap_or_else(|| "127.0.0.1:8080".to_string());
    let addr: SocketAddr = listen
        .trim()
        .parse()
        .map_err(|_| TradesimError::ConfigInvalid {
            section: "web".into(),
            key: "listen".into(),
            reason: format!("'{}' is not a socket address", listen),
        })?;

    let router = build_router(AppState { provider });

    eprintln!("Starting web server on {}", addr);
    tracing::info!(%addr, "listening");
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await
    })?;
    Ok(())
}

#[cfg(not(feature = "web"))]
fn run_serve(_config_path: &Path) -> Result<(), TradesimError> {
    Err(TradesimError::Io(io::Error::other(
        "web feature is required for serve",
    )))
}
