//! steg-notepad - hide notes in lossless cover images.
//!
//! Stores encoded text in the least significant bits of PNG and WebP images
//! and reads it back.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use steg_notepad::encoding::DataEncoder;
use steg_notepad::notepad::{
    capacity_report, clean_images, decode_text, encode_text, normalize_args, redact_password,
    storage_cli_arguments, StorageArgs,
};
use steg_notepad::storage::CoverImageSet;
use steg_notepad::StorageArguments;
use tracing::Level;

#[derive(Parser)]
#[command(name = "steg-notepad")]
#[command(author, version)]
#[command(
    about = "Hide notes inside lossless PNG and WebP images",
    long_about = "Encodes text into the least significant bits of one or more cover images, with optional compression, encryption, dummy bytes and shuffling."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a note and write it into the cover images
    Save {
        #[command(flatten)]
        storage: StorageArgs,

        /// Prompt for the password instead of passing it with -p
        #[arg(long)]
        ask_password: bool,

        /// Input file containing the note
        #[arg(long, conflicts_with = "text")]
        input: Option<PathBuf>,

        /// Note text
        #[arg(long, conflicts_with = "input", allow_hyphen_values = true)]
        text: Option<String>,
    },

    /// Read and decode the note stored in the cover images
    Load {
        #[command(flatten)]
        storage: StorageArgs,

        /// Prompt for the password instead of passing it with -p
        #[arg(long)]
        ask_password: bool,

        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Irreversibly overwrite all hidden data in the cover images
    Clean {
        #[command(flatten)]
        storage: StorageArgs,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Show the storage capacity of the cover images
    Info {
        #[command(flatten)]
        storage: StorageArgs,
    },

    /// Print the flag vector equivalent to the given settings
    Args {
        #[command(flatten)]
        storage: StorageArgs,

        /// Also write the resolved settings to a JSON file
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse_from(normalize_args(std::env::args()));
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Save {
            storage,
            ask_password,
            input,
            text,
        } => cmd_save(storage, ask_password, input, text),

        Commands::Load {
            storage,
            ask_password,
            output,
        } => cmd_load(storage, ask_password, output),

        Commands::Clean { storage, force } => cmd_clean(storage, force),

        Commands::Info { storage } => cmd_info(storage),

        Commands::Args { storage, save } => cmd_args(storage, save),
    }
}

fn prompt_password(prompt: &str) -> Result<String> {
    rpassword::prompt_password(prompt).context("Could not read password")
}

fn resolve(storage: StorageArgs, ask_password: bool) -> Result<StorageArguments> {
    let mut args = storage
        .into_arguments()
        .context("Could not parse settings")?;
    if ask_password {
        args.encoding.password = prompt_password("Password: ")?;
    }
    args.validate()?;
    Ok(args)
}

fn cmd_save(
    storage: StorageArgs,
    ask_password: bool,
    input: Option<PathBuf>,
    text: Option<String>,
) -> Result<()> {
    let args = resolve(storage, ask_password)?;

    let content = match (input, text) {
        (Some(path), None) => std::fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?,
        (None, Some(s)) => s,
        (None, None) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        (Some(_), Some(_)) => bail!("--input and --text cannot be used together"),
    };

    let bits = encode_text(&content, &args, &DataEncoder).context("Could not save text to images")?;
    println!(
        "Saved {} characters ({} bits) to {} image(s)",
        content.chars().count(),
        bits,
        args.cover_images.len()
    );

    Ok(())
}

fn cmd_load(storage: StorageArgs, ask_password: bool, output: Option<PathBuf>) -> Result<()> {
    let args = resolve(storage, ask_password)?;
    let text = decode_text(&args, &DataEncoder).context("Could not load text from images")?;

    match output {
        Some(path) => {
            std::fs::write(&path, &text)?;
            println!("Wrote {} characters to {}", text.chars().count(), path.display());
        }
        None => {
            io::stdout().write_all(text.as_bytes())?;
        }
    }

    Ok(())
}

fn cmd_clean(storage: StorageArgs, force: bool) -> Result<()> {
    let args = resolve(storage, false)?;
    let covers = CoverImageSet::from_arguments(&args)?;

    if !force {
        eprint!(
            "Cleaning these images will permanently remove any data stored in them. Continue? [y/N] "
        );
        io::stderr().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted");
            return Ok(());
        }
    }

    let bits = clean_images(&covers).context("Could not clean images")?;
    println!("Overwrote {} bits across {} image(s)", bits, covers.len());

    Ok(())
}

fn cmd_info(storage: StorageArgs) -> Result<()> {
    let args = resolve(storage, false)?;
    let covers = CoverImageSet::from_arguments(&args)?;
    let report = capacity_report(&covers)?;

    println!("Cover Image Capacity");
    println!("====================");
    for (path, bits) in &report.images {
        println!("  {:>10} bits  {}", bits, path.display());
    }
    println!();
    println!("Total:            {} bits", report.total_bits);
    println!("Chunk table:      {} bits", report.table_bits);
    println!("Max payload:      {} bytes", report.max_payload_bytes);

    Ok(())
}

fn cmd_args(storage: StorageArgs, save: Option<PathBuf>) -> Result<()> {
    let args = storage.into_arguments()?;
    if args.cover_images.is_empty() && save.is_some() {
        bail!("Refusing to save settings without cover images");
    }

    let flags = storage_cli_arguments(&args);
    println!("{}", redact_password(&flags).join(" "));

    if let Some(path) = save {
        args.save(&path)?;
        println!("Saved settings to {}", path.display());
    }

    Ok(())
}
