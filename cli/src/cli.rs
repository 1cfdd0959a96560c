use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cryptool_core::constants::DEFAULT_ALGORITHM;

#[derive(Parser, Debug)]
#[command(name = "cryptool")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Password-based streaming file encryption")]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Hide the progress bar
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encrypt a file into a .crpt container
    Encrypt {
        input: PathBuf,

        /// Output path (default: <input>.crpt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,

        /// aes128-gcm, aes192-gcm, aes256-gcm or chacha20-poly1305
        #[arg(short, long, default_value = DEFAULT_ALGORITHM)]
        algorithm: String,

        /// Fixed plaintext block size in bytes (default: planned from free memory)
        #[arg(long)]
        block_size: Option<u64>,
    },

    /// Decrypt a .crpt container
    Decrypt {
        input: PathBuf,

        /// Output path (default: <input> without .crpt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Print a container's header without decrypting it
    Inspect {
        input: PathBuf,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}
