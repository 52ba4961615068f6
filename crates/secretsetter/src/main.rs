//! secretsetter - Write STDIN into Infisical as SECRET_NAME
//!
//! Usage:
//!   secretsetter [--env ENV] [--path PATH] [--overwrite] [--log-level LEVEL] SECRET_NAME
//!
//! Exit codes:
//! - 0: secret created or overwritten
//! - 1: anything else

use anyhow::Result;
use clap::Parser;
use secretsetter::cli::{self, Cli};
use secretsetter::{
    logging, setter, InfisicalClient, Outcome, SecretCoordinates, SetRequest, Settings,
};
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if cli::is_parse_failure(&err) {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(err) = logging::init(cli.level()) {
        eprintln!("error: {:#}", err);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Outcome> {
    let settings = Settings::from_env()?;

    let request = SetRequest {
        coordinates: SecretCoordinates {
            project_id: settings.project_id.clone(),
            environment: cli.env,
            path: cli.path,
            name: cli.secret_name,
        },
        overwrite: cli.overwrite,
    };

    let mut client = InfisicalClient::from_settings(&settings)?;

    // Every step is sequential; one thread is enough
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = rt.block_on(setter::run(&mut client, std::io::stdin().lock(), &request))?;

    Ok(outcome)
}
