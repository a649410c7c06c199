//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info, info_span, warn};
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::adapters::binance_adapter::{BinanceKlineAdapter, DEFAULT_BASE_URL};
use crate::adapters::csv_adapter::CsvCandleAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::paper_execution::PaperExecutionAdapter;
use crate::adapters::tracing_sink::TracingEventSink;
use crate::domain::account::{AccountState, RiskConfig, SharedAccount};
use crate::domain::config_validation::validate_config;
use crate::domain::engine::{DecisionEngine, RunSummary};
use crate::domain::error::TraderError;
use crate::domain::indicator::compute_indicators;
use crate::domain::session::{load_series, run_session, DataSource, MarketRequest};
use crate::domain::signal::crossover;
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;

#[derive(Parser, Debug)]
#[command(name = "emacross", about = "EMA crossover signal engine")]
pub struct Cli {
    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Also append log records to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate the configured market and submit intents to the paper gateway
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        interval: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        /// csv or binance
        #[arg(long)]
        source: Option<DataSource>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        journal: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the indicator snapshot for every evaluable bar
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        interval: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        /// csv or binance
        #[arg(long)]
        source: Option<DataSource>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

/// Command line values that take precedence over the `[market]` section.
#[derive(Debug, Clone, Default)]
pub struct MarketOverrides {
    pub symbol: Option<String>,
    pub interval: Option<String>,
    pub limit: Option<usize>,
}

/// Command line values that pick the market data adapter.
#[derive(Debug, Clone, Default)]
pub struct DataOverrides {
    pub source: Option<DataSource>,
    pub data_dir: Option<PathBuf>,
}

/// `[execution]` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionSettings {
    pub max_quantity: Option<f64>,
    pub journal: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    init_tracing(&cli.log_level, cli.log_file.as_deref());
    match cli.command {
        Command::Run {
            config,
            symbol,
            interval,
            limit,
            source,
            data_dir,
            journal,
        } => run_trading(
            &config,
            MarketOverrides {
                symbol,
                interval,
                limit,
            },
            DataOverrides { source, data_dir },
            journal,
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Indicators {
            config,
            symbol,
            interval,
            limit,
            source,
            data_dir,
        } => run_indicators(
            &config,
            MarketOverrides {
                symbol,
                interval,
                limit,
            },
            DataOverrides { source, data_dir },
        ),
    }
}

fn init_tracing(level: &str, log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let file_layer = log_file.and_then(|path| match open_log_file(path) {
        Ok(file) => Some(log_file_layer(file)),
        Err(e) => {
            eprintln!("cannot open log file {}: {e}", path.display());
            None
        }
    });
    // Already initialised when run is called more than once in a process.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .try_init();
}

/// Open `path` for appending, creating it if needed.
pub fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Plain-text fmt layer writing every record to `file`.
pub fn log_file_layer<S>(file: File) -> fmt::Layer<S, DefaultFields, Format, Mutex<File>> {
    fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        error!("{err}");
        ExitCode::from(&err)
    })
}

fn load_and_validate(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    info!(path = %path.display(), "Loading config");
    let adapter = load_config(path)?;
    validate_config(&adapter).map_err(|e| {
        error!("{e}");
        ExitCode::from(&e)
    })?;
    Ok(adapter)
}

pub fn build_market_request(
    adapter: &dyn ConfigPort,
    overrides: &MarketOverrides,
) -> Result<MarketRequest, TraderError> {
    let defaults = MarketRequest::default();
    let symbol = match &overrides.symbol {
        Some(s) => s.clone(),
        None => adapter
            .get_string("market", "symbol")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| TraderError::ConfigMissing {
                section: "market".into(),
                key: "symbol".into(),
            })?,
    };
    let interval = overrides
        .interval
        .clone()
        .or_else(|| adapter.get_string("market", "interval"))
        .unwrap_or(defaults.interval);
    let limit = match overrides.limit {
        Some(limit) => limit,
        None => {
            let limit = adapter.get_int("market", "limit", defaults.limit as i64);
            usize::try_from(limit).map_err(|_| {
                TraderError::config_invalid("market", "limit", "limit must be at least 1")
            })?
        }
    };
    if limit == 0 {
        return Err(TraderError::config_invalid(
            "market",
            "limit",
            "limit must be at least 1",
        ));
    }

    Ok(MarketRequest {
        symbol: symbol.trim().to_uppercase(),
        interval: interval.trim().to_string(),
        limit,
    })
}

pub fn build_strategy_config(adapter: &dyn ConfigPort) -> StrategyConfig {
    let defaults = StrategyConfig::default();
    StrategyConfig {
        fast_period: adapter.get_int("strategy", "fast_period", defaults.fast_period as i64)
            as usize,
        slow_period: adapter.get_int("strategy", "slow_period", defaults.slow_period as i64)
            as usize,
        risk_reward_ratio: adapter.get_double(
            "strategy",
            "risk_reward_ratio",
            defaults.risk_reward_ratio,
        ),
        volume_threshold: adapter.get_opt_double("strategy", "volume_threshold"),
    }
}

pub fn build_risk_config(adapter: &dyn ConfigPort) -> RiskConfig {
    let defaults = RiskConfig::default();
    RiskConfig {
        initial_balance: adapter.get_double("risk", "initial_balance", defaults.initial_balance),
        risk_per_trade: adapter.get_double("risk", "risk_per_trade", defaults.risk_per_trade),
        max_drawdown: adapter.get_opt_double("risk", "max_drawdown"),
    }
}

pub fn build_execution_settings(adapter: &dyn ConfigPort) -> ExecutionSettings {
    ExecutionSettings {
        max_quantity: adapter.get_opt_double("execution", "max_quantity"),
        journal: adapter
            .get_string("execution", "journal")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from),
    }
}

pub fn resolve_data_dir(adapter: &dyn ConfigPort, data_dir: Option<PathBuf>) -> PathBuf {
    data_dir
        .or_else(|| adapter.get_string("market", "data_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Command line `--source`, then `[market] source`, then CSV.
pub fn resolve_data_source(
    adapter: &dyn ConfigPort,
    source: Option<DataSource>,
) -> Result<DataSource, TraderError> {
    match source {
        Some(source) => Ok(source),
        None => match adapter.get_string("market", "source") {
            Some(value) if !value.trim().is_empty() => value
                .parse()
                .map_err(|reason: String| TraderError::config_invalid("market", "source", reason)),
            _ => Ok(DataSource::default()),
        },
    }
}

/// Build the market data adapter selected by config and overrides.
pub fn build_data_port(
    adapter: &dyn ConfigPort,
    overrides: &DataOverrides,
) -> Result<Box<dyn MarketDataPort>, TraderError> {
    let port: Box<dyn MarketDataPort> = match resolve_data_source(adapter, overrides.source)? {
        DataSource::Csv => Box::new(CsvCandleAdapter::new(resolve_data_dir(
            adapter,
            overrides.data_dir.clone(),
        ))),
        DataSource::Binance => {
            let base_url = adapter
                .get_string("market", "base_url")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
            Box::new(BinanceKlineAdapter::new(base_url)?)
        }
    };
    Ok(port)
}

/// Fetch, evaluate and submit for one market, then write the journal if one
/// is configured.
pub fn run_pipeline(
    data_port: &dyn MarketDataPort,
    request: &MarketRequest,
    strategy: StrategyConfig,
    risk: RiskConfig,
    execution: &ExecutionSettings,
) -> Result<RunSummary, TraderError> {
    let _span = info_span!("run", symbol = %request.symbol, interval = %request.interval).entered();

    let sink = TracingEventSink::new(&request.symbol);
    let gateway = PaperExecutionAdapter::new(execution.max_quantity);
    let account = SharedAccount::new(AccountState::new(risk));
    info!(
        periods = %strategy.periods(),
        risk_reward_ratio = strategy.risk_reward_ratio,
        volume_threshold = ?strategy.volume_threshold,
        "Starting run"
    );
    let engine = DecisionEngine::new(strategy, &sink, &gateway);

    let summary = run_session(data_port, request, &engine, &account)?;

    if let Some(path) = &execution.journal {
        gateway.write_journal(path)?;
        info!(path = %path.display(), rows = gateway.accepted().len(), "Journal written");
    }
    Ok(summary)
}

pub fn run_trading(
    config_path: &Path,
    overrides: MarketOverrides,
    data: DataOverrides,
    journal: Option<PathBuf>,
) -> ExitCode {
    let adapter = match load_and_validate(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let request = match build_market_request(&adapter, &overrides) {
        Ok(r) => r,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };
    let strategy = build_strategy_config(&adapter);
    let risk = build_risk_config(&adapter);
    let mut execution = build_execution_settings(&adapter);
    if journal.is_some() {
        execution.journal = journal;
    }

    let data_port = match build_data_port(&adapter, &data) {
        Ok(p) => p,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };
    match run_pipeline(data_port.as_ref(), &request, strategy, risk, &execution) {
        Ok(summary) => {
            print_summary(&request, &summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

fn print_summary(request: &MarketRequest, summary: &RunSummary) {
    println!("=== {} {} ===", request.symbol, request.interval);
    println!("Candles:          {}", summary.bars);
    println!("Bars evaluated:   {}", summary.evaluated);
    println!("Intents emitted:  {}", summary.intents.len());
    println!("Accepted:         {}", summary.accepted());
    println!("Rejected:         {}", summary.rejected);
    match summary.halted_at {
        Some(index) => println!("Halted at bar:    {}", index),
        None => println!("Halted at bar:    -"),
    }
    println!("Final balance:    {:.2}", summary.final_balance);
    for intent in &summary.intents {
        println!("  {}", intent);
    }
}

pub fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_and_validate(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let strategy = build_strategy_config(&adapter);
    let risk = build_risk_config(&adapter);

    println!("Config validated successfully");
    println!("  indicators:      {}", strategy.periods());
    println!("  reward/risk:     {}", strategy.risk_reward_ratio);
    match strategy.volume_threshold {
        Some(v) => println!("  volume gate:     > {}", v),
        None => println!("  volume gate:     off"),
    }
    println!("  initial balance: {}", risk.initial_balance);
    println!("  risk per trade:  {}%", risk.risk_per_trade);
    match risk.max_drawdown {
        Some(dd) => println!("  drawdown halt:   {}%", dd * 100.0),
        None => println!("  drawdown halt:   off"),
    }
    ExitCode::SUCCESS
}

pub fn run_indicators(
    config_path: &Path,
    overrides: MarketOverrides,
    data: DataOverrides,
) -> ExitCode {
    let adapter = match load_and_validate(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let request = match build_market_request(&adapter, &overrides) {
        Ok(r) => r,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };
    let periods = build_strategy_config(&adapter).periods();
    let data_port = match build_data_port(&adapter, &data) {
        Ok(p) => p,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };

    let series = match load_series(data_port.as_ref(), &request) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };
    if series.len() < periods.min_bars() {
        warn!(
            bars = series.len(),
            minimum = periods.min_bars(),
            "Not enough candles to compute indicators"
        );
        return ExitCode::SUCCESS;
    }

    println!("index,open_time,close,fast_ema,slow_ema,volatility,signal");
    for index in periods.first_index()..series.len() {
        let snapshot = match compute_indicators(&series, index, periods) {
            Ok(s) => s,
            Err(e) => {
                error!("{e}");
                return (&e).into();
            }
        };
        let Some(candle) = series.get(index) else {
            break;
        };
        let signal = crossover(&snapshot)
            .map(|side| side.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{},{},{},{:.6},{:.6},{:.6},{}",
            index,
            candle.open_time.to_rfc3339(),
            candle.close,
            snapshot.fast_ema,
            snapshot.slow_ema,
            snapshot.volatility,
            signal
        );
    }
    ExitCode::SUCCESS
}
