//! jt-core: exact inference over discrete Bayesian networks.

use clap::Parser;
use jt_common::OutputFormat;
use jt_core::cli::{error_json, run, Cli};
use jt_core::exit_codes::ExitCode;
use jt_core::logging::init_logging;
use tracing::error;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            error!(code = err.code(), "{err}");
            if cli.format == OutputFormat::Json {
                println!("{}", error_json(&err));
            }
            eprintln!("jt-core: {err}");
            ExitCode::from_error(&err)
        }
    };
    std::process::exit(code.as_i32());
}
