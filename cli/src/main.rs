//! cryptool - password-based streaming file encryption
//!
//! Usage:
//!   cryptool encrypt <input> [-o out] [-p password] [-a algorithm]
//!   cryptool decrypt <input> [-o out] [-p password]
//!   cryptool inspect <input> [--json]

mod cli;
mod paths;
mod progress;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use cryptool_core::stream::{decrypt_file, encrypt_file, inspect_header, ApiConfig, InputSource};
use cryptool_core::telemetry::TelemetrySnapshot;

use crate::cli::{Cli, Commands};
use crate::progress::BarProgress;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_password(given: Option<String>, confirm: bool) -> Result<Zeroizing<String>> {
    if let Some(p) = given {
        return Ok(Zeroizing::new(p));
    }

    let first = Zeroizing::new(rpassword::prompt_password("Password: ").context("failed to read password")?);
    if confirm {
        let second = Zeroizing::new(rpassword::prompt_password("Confirm password: ").context("failed to read password")?);
        if *first != *second {
            bail!("passwords do not match");
        }
    }
    Ok(first)
}

fn log_stages(snapshot: &TelemetrySnapshot) {
    debug!(
        elapsed = ?snapshot.elapsed,
        staged = ?snapshot.total_stage_time(),
        throughput = snapshot.throughput_plaintext_bytes_per_sec,
        "run timing"
    );
    for (stage, _) in &snapshot.stage_times {
        debug!(%stage, ms = snapshot.stage_times.get_ms(*stage), "stage");
    }
}

fn bar(quiet: bool, operation: &str) -> BarProgress {
    if quiet {
        BarProgress::hidden()
    } else {
        BarProgress::new(operation)
    }
}

fn encrypt(
    input: &Path,
    output: Option<&Path>,
    password: Option<String>,
    algorithm: &str,
    block_size: Option<u64>,
    quiet: bool,
) -> Result<()> {
    let output = output.map(Path::to_path_buf).unwrap_or_else(|| paths::encrypt_output(input));
    let password = read_password(password, true)?;

    let mut config = ApiConfig::default();
    config.block_size = block_size;

    let snapshot = encrypt_file(input, &output, password.as_bytes(), algorithm, &config, &bar(quiet, "encrypt"))
        .with_context(|| format!("encrypting {}", input.display()))?;

    info!(output = %output.display(), blocks = snapshot.blocks, "done");
    log_stages(&snapshot);
    Ok(())
}

fn decrypt(input: &Path, output: Option<&Path>, password: Option<String>, quiet: bool) -> Result<()> {
    let output = match output {
        Some(p) => p.to_path_buf(),
        None => paths::decrypt_output(input)?,
    };
    let password = read_password(password, false)?;

    let snapshot = decrypt_file(input, &output, password.as_bytes(), &ApiConfig::default(), &bar(quiet, "decrypt"))
        .with_context(|| format!("decrypting {}", input.display()))?;

    info!(output = %output.display(), blocks = snapshot.blocks, "done");
    log_stages(&snapshot);
    Ok(())
}

fn inspect(input: &Path, json: bool) -> Result<()> {
    let info = inspect_header(InputSource::File(input.to_path_buf()))
        .with_context(|| format!("inspecting {}", input.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("algorithm:   {} (id {})", info.algorithm, info.header.algorithm_id);
    println!("block size:  {} bytes", info.header.block_size);
    println!("nonce size:  {} bytes", info.header.nonce_size);
    println!("salt:        {} bytes", info.header.salt.len());
    println!("header:      {} bytes", info.header_len);
    if let Some(len) = info.container_len {
        println!("container:   {} bytes", len);
    }
    match info.plaintext_len {
        Some(len) => println!("plaintext:   {} bytes", len),
        None if info.container_len.is_some() => println!("plaintext:   unknown (block layout inconsistent)"),
        None => {}
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Encrypt { input, output, password, algorithm, block_size } => {
            encrypt(&input, output.as_deref(), password, &algorithm, block_size, cli.quiet)
        }
        Commands::Decrypt { input, output, password } => {
            decrypt(&input, output.as_deref(), password, cli.quiet)
        }
        Commands::Inspect { input, json } => inspect(&input, json),
    }
}
