//! CLI definition and dispatch.
//!
//! Compiled artifacts and requests are printed to stdout as JSON; progress
//! and errors go through `tracing` to stderr.

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, Level};

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::open_store;
use crate::domain::catalog::{self, SemanticType};
use crate::domain::compiler::recompile;
use crate::domain::config_validation::{validate_all, BACKTEST_SECTION};
use crate::domain::error::StratError;
use crate::domain::expression_parser::{self, GroupExpr};
use crate::domain::request::{self, RequestOverrides};
use crate::domain::session::SideSession;
use crate::domain::side::Side;
use crate::domain::strategy_config::{build_side, defined_sides, side_edits};
use crate::domain::symbol_key::normalize;
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(
    name = "stratbuilder",
    about = "Compile indicator strategies into backtest expressions"
)]
pub struct Cli {
    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: Level,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a strategy file and persist the artifacts
    Compile {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        side: Option<Side>,
    },
    /// Print the persisted artifacts for one side
    Show {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        side: Side,
    },
    /// Print the backtest request assembled from the store
    Request {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        #[arg(long)]
        days: Option<u32>,
    },
    /// List the available indicators and their parameters
    Indicators,
    /// Parse an expression string and describe its structure
    Inspect { expression: String },
    /// Validate a strategy file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn execute(command: Command) -> Result<(), StratError> {
    match command {
        Command::Compile { config, side } => run_compile(&config, side),
        Command::Show { config, side } => run_show(&config, side),
        Command::Request {
            config,
            ticker,
            days,
        } => run_request(&config, ticker, days),
        Command::Indicators => {
            print_indicators();
            Ok(())
        }
        Command::Inspect { expression } => run_inspect(&expression),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StratError> {
    info!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path).map_err(|e| StratError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn load_validated(path: &Path) -> Result<FileConfigAdapter, StratError> {
    let adapter = load_config(path)?;
    validate_all(&adapter)?;
    Ok(adapter)
}

/// Request overrides from `[backtest]`, with command-line values taking precedence.
pub fn resolve_overrides(
    config: &dyn ConfigPort,
    ticker: Option<String>,
    days: Option<u32>,
) -> RequestOverrides {
    let ticker = ticker.or_else(|| {
        config
            .get_string(BACKTEST_SECTION, "ticker")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    });
    let days = days.or_else(|| {
        config
            .get_string(BACKTEST_SECTION, "days")
            .and_then(|d| d.trim().parse::<u32>().ok())
            .filter(|d| *d > 0)
    });
    RequestOverrides { ticker, days }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), StratError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_compile(config_path: &Path, side: Option<Side>) -> Result<(), StratError> {
    let adapter = load_validated(config_path)?;
    let store = open_store(&adapter)?;

    let overrides = resolve_overrides(&adapter, None, None);
    if overrides.ticker.is_some() || overrides.days.is_some() {
        request::store_selection(
            store.as_ref(),
            overrides.ticker.as_deref(),
            overrides.days.unwrap_or(request::DEFAULT_DAYS),
        )?;
    }

    let sides: Vec<Side> = match side {
        Some(s) => vec![s],
        None => Side::ALL.to_vec(),
    };

    let mut output = Map::new();
    for side in sides {
        let edits = side_edits(&adapter, side)?;
        info!("Compiling {} side ({} edits)", side, edits.len());
        let mut session = SideSession::open(side, store.as_ref());
        session.apply_all(&edits);
        session.save()?;
        info!("{}: {}", side, session.compiled().expression);
        output.insert(
            side.as_str().to_string(),
            serde_json::to_value(session.compiled())?,
        );
    }

    print_json(&Value::Object(output))
}

fn run_show(config_path: &Path, side: Side) -> Result<(), StratError> {
    let adapter = load_config(config_path)?;
    let store = open_store(&adapter)?;
    let session = SideSession::open(side, store.as_ref());
    if session.persisted().is_none() {
        info!("Nothing persisted for {} side", side);
    }
    print_json(session.displayed())
}

fn run_request(
    config_path: &Path,
    ticker: Option<String>,
    days: Option<u32>,
) -> Result<(), StratError> {
    let adapter = load_validated(config_path)?;
    let store = open_store(&adapter)?;
    let overrides = resolve_overrides(&adapter, ticker, days);
    let req = request::assemble(store.as_ref(), &overrides)?;
    if req.ticker.is_empty() {
        info!("No ticker selected");
    }
    print_json(&req)
}

fn print_indicators() {
    for (kind, label) in catalog::options() {
        let fields: Vec<String> = catalog::lookup(kind)
            .iter()
            .map(|f| {
                let ty = match f.semantic_type {
                    SemanticType::Int => "int",
                    SemanticType::Str => "str",
                };
                format!("{}:{}", f.key, ty)
            })
            .collect();
        println!(
            "{:<12} {:<12} {:<26} {}",
            kind,
            normalize(kind),
            label,
            fields.join(", ")
        );
    }
}

fn run_inspect(expression: &str) -> Result<(), StratError> {
    let parsed = match expression_parser::parse(expression) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e.display_with_context(expression));
            return Err(e.into());
        }
    };

    for (i, group) in parsed.groups.iter().enumerate() {
        match group {
            GroupExpr::Placeholder => println!("group {}: empty", i + 1),
            GroupExpr::Conditions(conds) => {
                println!("group {}:", i + 1);
                for cond in conds {
                    let known = if cond.is_known() { "" } else { " (unknown key)" };
                    println!(
                        "  {} operands={:?} trend={}{}",
                        cond.api_key, cond.operands, cond.trend, known
                    );
                }
            }
        }
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), StratError> {
    let adapter = load_validated(config_path)?;

    for side in defined_sides(&adapter) {
        let compiled = recompile(&build_side(&adapter, side)?);
        println!("{}: {}", side, compiled.expression);
    }
    info!("Strategy file is valid");
    Ok(())
}
