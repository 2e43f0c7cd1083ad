//! pagestore CLI
//!
//! Creates block files and inspects existing ones.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pagestore::{AccessMode, BlockFile, Config, StoreError};
use tracing_subscriber::{fmt, EnvFilter};

/// pagestore block file tool
#[derive(Parser, Debug)]
#[command(name = "pagestore")]
#[command(about = "Create and inspect block files")]
#[command(version)]
struct Args {
    /// Block size in bytes
    #[arg(short, long, global = true, default_value = "16")]
    block_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a header to a new file, or validate an existing one
    Init {
        /// The block file
        path: PathBuf,

        /// Open in synchronous write mode
        #[arg(long)]
        sync: bool,
    },

    /// Validate the header without modifying the file
    Verify {
        /// The block file
        path: PathBuf,
    },

    /// Show length, block count and header status
    Info {
        /// The block file
        path: PathBuf,
    },

    /// Print a CRC32 fingerprint for every block
    Blocks {
        /// The block file
        path: PathBuf,
    },

    /// Hex dump one block
    Dump {
        /// The block file
        path: PathBuf,

        /// Block index
        #[arg(long)]
        block: u64,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pagestore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!("pagestore v{}", pagestore::VERSION);

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> pagestore::Result<()> {
    let config = |mode: AccessMode| {
        Config::builder()
            .block_size(args.block_size)
            .access_mode(mode)
            .build()
    };

    match &args.command {
        Commands::Init { path, sync } => {
            let mode = if *sync {
                AccessMode::ReadWriteSync
            } else {
                AccessMode::ReadWrite
            };
            let mut file = BlockFile::open_path(path, config(mode))?;
            file.init()?;
            file.sync();
            println!("{}: header ok ({} bytes)", path.display(), file.length());
            file.close()
        }
        Commands::Verify { path } => {
            let mut file = BlockFile::open_path(path, config(AccessMode::ReadOnly))?;
            if file.length() < file.config().header_length() {
                return Err(StoreError::Corrupt(format!(
                    "{} is shorter than its header",
                    path.display()
                )));
            }
            file.init()?;
            println!("{}: header ok", path.display());
            file.close()
        }
        Commands::Info { path } => {
            let mut file = BlockFile::open_path(path, config(AccessMode::ReadOnly))?;
            let block_size = file.block_size() as u64;
            let length = file.length();
            let header = if length < file.config().header_length() {
                "missing".to_string()
            } else {
                match file.init() {
                    Ok(()) => "ok".to_string(),
                    Err(e) => e.to_string(),
                }
            };
            println!("path:        {}", path.display());
            println!("length:      {}", length);
            println!("block size:  {}", block_size);
            println!("blocks:      {}", length / block_size);
            if length % block_size != 0 {
                println!("trailing:    {} bytes", length % block_size);
            }
            println!("header:      {}", header);
            file.close()
        }
        Commands::Blocks { path } => {
            let mut file = BlockFile::open_path(path, config(AccessMode::ReadOnly))?;
            let count = file.length() / file.block_size() as u64;
            for index in 0..count {
                let page = file.read_page(index, 1)?;
                println!("{:>8}  {:08x}", index, crc32fast::hash(page.as_bytes()));
            }
            file.close()
        }
        Commands::Dump { path, block } => {
            let mut file = BlockFile::open_path(path, config(AccessMode::ReadOnly))?;
            let page = file.read_page(*block, 1)?;
            let base = block * file.block_size() as u64;
            for (i, row) in page.as_bytes().chunks(16).enumerate() {
                let hex: Vec<String> = row.iter().map(|b| format!("{:02x}", b)).collect();
                let text: String = row
                    .iter()
                    .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
                    .collect();
                println!("{:08x}  {:<47}  {}", base + (i * 16) as u64, hex.join(" "), text);
            }
            file.close()
        }
    }
}
