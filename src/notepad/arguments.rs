//! Command-line style storage arguments.
//!
//! The session turns its free-text settings into the same flag vector a user
//! would type (`-c a.png,b.png -p pw -r seed -a 2 -d 8 -co`) and parses it
//! with the same parser the binary uses, so both entry points share one set
//! of validation rules.

use crate::config::{EncodingConfig, StorageArguments};
use crate::error::{Error, Result};
use crate::notepad::session::{CoverImage, SettingsModel};
use clap::{Args, Parser};
use std::path::{Path, PathBuf};

/// Short form of the compression flag accepted on the command line.
pub const COMPRESS_SHORT_FLAG: &str = "-co";

/// Options whose next token is a value, never a flag.
const VALUE_OPTIONS: &[&str] = &[
    "-c",
    "--cover-images",
    "-p",
    "--password",
    "-r",
    "--random-seed",
    "-a",
    "--additional-hashes",
    "-d",
    "--dummy-count",
    "--settings",
    "--input",
    "--text",
    "--output",
    "--save",
];

/// Storage flags shared by every command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageArgs {
    /// Comma separated cover images (PNG or WebP) or directories of them
    #[arg(short = 'c', long = "cover-images", value_delimiter = ',', allow_hyphen_values = true)]
    pub cover_images: Vec<PathBuf>,

    /// Password used to encrypt the note
    #[arg(short = 'p', long, allow_hyphen_values = true)]
    pub password: Option<String>,

    /// Seed used to shuffle the payload and place dummy bytes
    #[arg(short = 'r', long = "random-seed", allow_hyphen_values = true)]
    pub random_seed: Option<String>,

    /// Additional password hash iterations
    #[arg(short = 'a', long = "additional-hashes", allow_hyphen_values = true)]
    pub additional_hashes: Option<u32>,

    /// Number of dummy bytes mixed into the payload
    #[arg(short = 'd', long = "dummy-count", allow_hyphen_values = true)]
    pub dummy_count: Option<usize>,

    /// Compress the note before encrypting it (also accepted as -co)
    #[arg(long)]
    pub compress: bool,

    /// JSON settings file providing defaults for the flags above
    #[arg(long)]
    pub settings: Option<PathBuf>,
}

impl StorageArgs {
    /// Resolve the flags into storage arguments.
    ///
    /// Values from `--settings` are used as a base; flags given on the command
    /// line take precedence.
    pub fn into_arguments(self) -> Result<StorageArguments> {
        let mut args = match &self.settings {
            Some(path) => StorageArguments::load(path)?,
            None => StorageArguments::default(),
        };

        if !self.cover_images.is_empty() {
            args.cover_images = self.cover_images;
        }

        let encoding: &mut EncodingConfig = &mut args.encoding;
        if let Some(password) = self.password {
            encoding.password = password;
        }
        if let Some(seed) = self.random_seed {
            encoding.random_seed = seed;
        }
        if let Some(hashes) = self.additional_hashes {
            encoding.additional_hashes = hashes;
        }
        if let Some(count) = self.dummy_count {
            encoding.dummy_count = count;
        }
        encoding.use_compression |= self.compress;

        Ok(args)
    }
}

#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct StorageArgsParser {
    #[command(flatten)]
    storage: StorageArgs,
}

/// Rewrite the two-letter `-co` flag into its long form so clap accepts it.
///
/// A `-co` that is the value of a preceding option (`-p -co`) is kept as is.
pub fn normalize_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut normalized = Vec::new();
    let mut expects_value = false;

    for arg in args.into_iter().map(Into::into) {
        if !expects_value && arg == COMPRESS_SHORT_FLAG {
            normalized.push("--compress".to_string());
            continue;
        }
        expects_value = !expects_value && VALUE_OPTIONS.contains(&arg.as_str());
        normalized.push(arg);
    }

    normalized
}

/// Parse a flag vector (without a binary name) into storage arguments.
pub fn parse_cli_arguments(args: &[String]) -> Result<StorageArguments> {
    let parsed = StorageArgsParser::try_parse_from(normalize_args(args.iter().cloned()))
        .map_err(|e| Error::Configuration(e.to_string().trim().to_string()))?;
    parsed.storage.into_arguments()
}

/// Build the flag vector for a set of session settings.
///
/// Empty fields are left out so the parser falls back to its defaults.
pub fn form_cli_arguments(settings: &SettingsModel, cover_images: &[CoverImage]) -> Vec<String> {
    let paths: Vec<&Path> = cover_images.iter().map(|image| image.path.as_path()).collect();
    build_flags(
        &paths,
        [
            ("-p", settings.password.as_str()),
            ("-r", settings.random_seed.as_str()),
            ("-a", settings.additional_hashes.trim()),
            ("-d", settings.dummy_count.trim()),
        ],
        settings.compression_enabled,
    )
}

/// Build the flag vector for resolved storage arguments.
///
/// Zero counts are left out since they are the parser's defaults; password
/// and seed are kept whenever they are non-empty.
pub fn storage_cli_arguments(args: &StorageArguments) -> Vec<String> {
    let encoding = &args.encoding;
    let hashes = encoding.additional_hashes.to_string();
    let dummies = encoding.dummy_count.to_string();

    let paths: Vec<&Path> = args.cover_images.iter().map(PathBuf::as_path).collect();
    build_flags(
        &paths,
        [
            ("-p", encoding.password.as_str()),
            ("-r", encoding.random_seed.as_str()),
            ("-a", if encoding.additional_hashes > 0 { hashes.as_str() } else { "" }),
            ("-d", if encoding.dummy_count > 0 { dummies.as_str() } else { "" }),
        ],
        encoding.use_compression,
    )
}

/// Shared flag layout: `-c a,b -p .. -r .. -a .. -d .. -co`, empty values skipped.
fn build_flags(cover_images: &[&Path], fields: [(&str, &str); 4], compress: bool) -> Vec<String> {
    let mut args = Vec::new();

    let joined = cover_images
        .iter()
        .map(|path| path.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(",");

    for (flag, value) in std::iter::once(("-c", joined.as_str())).chain(fields) {
        if value.is_empty() {
            continue;
        }
        args.push(flag.to_string());
        args.push(value.to_string());
    }

    if compress {
        args.push(COMPRESS_SHORT_FLAG.to_string());
    }

    args
}

/// Copy of a flag vector with the password value masked, for logging.
pub fn redact_password(args: &[String]) -> Vec<String> {
    let mut redacted = args.to_vec();
    for i in 1..redacted.len() {
        if redacted[i - 1] == "-p" || redacted[i - 1] == "--password" {
            redacted[i] = "***".to_string();
        }
    }
    redacted
}
