//! Command-line interface.

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use jt_common::{Error, OutputFormat, Result, SCHEMA_VERSION};
use jt_config::{resolve_model_path, ModelFile, ModelSnapshot};
use jt_math::VarId;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::info;

use crate::check::{run_checks, DEFAULT_TOLERANCE};
use crate::exit_codes::ExitCode;
use crate::model::InferenceModel;
use crate::report::{CalibrationReport, CheckReport, ModelProvenance, QueryReport};

#[derive(Parser, Debug)]
#[command(
    name = "jt-core",
    about = "Exact inference over discrete Bayesian networks",
    version
)]
pub struct Cli {
    /// Output format for reports
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Model file (overrides JT_MODEL and the config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Calibrate the clique tree and print every clique and sepset belief
    Calibrate,
    /// Joint marginal over a set of variables by variable elimination
    Query(QueryArgs),
    /// Verify calibration consistency and agreement with variable elimination
    Check {
        #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
        tolerance: f64,
    },
    /// Print the JSON schema of the model file
    Schema,
    /// Generate shell completions
    Completions { shell: Shell },
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Variables to keep, by name or id
    #[arg(long, value_delimiter = ',', required = true)]
    pub vars: Vec<String>,

    /// Variables to eliminate first, in this order
    #[arg(long, value_delimiter = ',')]
    pub order: Vec<String>,

    /// Rescale the result to sum to one
    #[arg(long)]
    pub normalize: bool,
}

/// Execute the parsed command, writing its report to stdout.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    match &cli.command {
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&ModelFile::json_schema())?);
            Ok(ExitCode::Clean)
        }
        Command::Completions { shell } => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "jt-core",
                &mut std::io::stdout(),
            );
            Ok(ExitCode::Clean)
        }
        Command::Calibrate => {
            let (model, provenance) = load(cli)?;
            let potentials = model.network.calibrate(&model.tree, &model.alpha)?;
            let report = CalibrationReport::build(provenance, &model, &potentials)?;
            emit(cli.format, &report.render_text(), &report)?;
            Ok(ExitCode::Clean)
        }
        Command::Query(args) => {
            let (model, provenance) = load(cli)?;
            let vars = args
                .vars
                .iter()
                .map(|t| model.lookup(t))
                .collect::<Result<BTreeSet<VarId>>>()?;
            let order = args
                .order
                .iter()
                .map(|t| model.lookup(t))
                .collect::<Result<Vec<VarId>>>()?;
            let joint = model.network.var_elim(&vars, &order)?;
            let report = QueryReport::build(provenance, &model, &order, &joint, args.normalize);
            emit(cli.format, &report.render_text(), &report)?;
            Ok(ExitCode::Clean)
        }
        Command::Check { tolerance } => {
            let (model, provenance) = load(cli)?;
            let checks = run_checks(&model, *tolerance)?;
            let report = CheckReport::new(provenance, *tolerance, checks);
            emit(cli.format, &report.render_text(), &report)?;
            Ok(if report.passed() {
                ExitCode::Clean
            } else {
                ExitCode::CheckFailed
            })
        }
    }
}

fn load(cli: &Cli) -> Result<(InferenceModel, ModelProvenance)> {
    let source = resolve_model_path(cli.model.as_deref());
    let snapshot = ModelSnapshot::load(source)?;
    info!(source = %snapshot.source, sha256 = %snapshot.sha256, "model loaded");
    let model = InferenceModel::from_model_file(&snapshot.model)?;
    Ok((model, ModelProvenance::from_snapshot(&snapshot)))
}

fn emit<T: Serialize>(format: OutputFormat, text: &str, value: &T) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{text}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

/// Machine-readable error body printed on stdout in JSON mode.
pub fn error_json(err: &Error) -> serde_json::Value {
    json!({
        "schema_version": SCHEMA_VERSION,
        "status": "error",
        "error": {
            "code": err.code(),
            "exit_code": ExitCode::from_error(err).as_i32(),
            "message": err.to_string(),
        }
    })
}
