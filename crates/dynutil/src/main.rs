// # dynutil
//
// Thin command-line layer over dynutil-core and the DynECT provider.
//
// One invocation runs one operation:
// 1. Parse and validate flags (no file or network access yet)
// 2. Load the credentials file
// 3. Open an authenticated session
// 4. Dispatch the command
// 5. Print the result on stdout
//
// Every failure ends up in `fail()`, which prints `<program>: error: <message>`
// on stderr and exits with code 1.
//
// ## Example
//
// ```bash
// dynutil -c creds.yaml -o list -t redirect -z example.com
// dynutil -c creds.yaml -o update -t a -z example.com -n www -v 203.0.113.5
// dynutil -c creds.yaml -o create -t mx -z example.com -n '' -v mail.example.com
// ```

mod cli;
mod config;

use anyhow::{Result, anyhow};
use clap::Parser;
use clap::error::ErrorKind;
use dynutil_core::traits::SessionConnector;
use dynutil_core::{Command, Credentials, Dispatcher, Invocation, output};
use dynutil_provider_dynect::DynectConnector;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use tracing::{Level, debug, warn};
use tracing_subscriber::FmtSubscriber;

use crate::cli::Cli;
use crate::config::Settings;

/// Basename of argv[0], used to prefix diagnostics
fn program_name() -> String {
    std::env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "dynutil".to_string())
}

/// Report a fatal error and produce the failure exit code
fn fail(program: &str, message: impl std::fmt::Display) -> ExitCode {
    eprintln!("{}: error: {}", program, message);
    ExitCode::from(1)
}

fn main() -> ExitCode {
    let program = program_name();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = e.print();
                    ExitCode::SUCCESS
                }
                _ => fail(&program, cli::clap_message(&e)),
            };
        }
    };

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => return fail(&program, e),
    };

    let log_level = if cli.debug {
        Level::DEBUG
    } else {
        settings.log_level
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        return fail(&program, format!("failed to set tracing subscriber: {}", e));
    }

    match run(&cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&program, e),
    }
}

fn run(cli: &Cli, settings: &Settings) -> Result<()> {
    let invocation = Invocation::from_options(cli.options())?;
    debug!("Validated command: {:?}", invocation.command);

    let credentials = Credentials::from_file(&invocation.creds_file)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow!("failed to create tokio runtime: {}", e))?;

    let rendered = runtime.block_on(execute(&invocation.command, &credentials, settings))?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| anyhow!("failed to write output: {}", e))?;
    Ok(())
}

/// Authenticate, run the command and render its outcome
async fn execute(command: &Command, credentials: &Credentials, settings: &Settings) -> Result<String> {
    let connector = DynectConnector::with_base_url(&settings.api_url)?;
    let session = connector
        .connect(credentials)
        .await
        .map_err(|e| anyhow!("could not authenticate: {}", e))?;

    let result = Dispatcher::new(session.as_ref()).execute(command).await;

    if let Err(e) = session.close().await {
        warn!("Failed to close session: {}", e);
    }

    let outcome = result?;
    Ok(output::render(&outcome)?)
}
