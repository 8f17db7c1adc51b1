use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use serde::Deserialize;

use rcore::registry::{CHECKSUM_ALGORITHMS, HASH_ALGORITHMS};
use rsig::format::DEFAULT_CHUNK_SIZE;

#[derive(Parser)]
#[command(name = "rdelta")]
#[command(about = "Signature and verified patch tool for rsync style binary deltas")]
#[command(author, version, long_about = None)]
pub struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the signature of a basis file
    Signature {
        basis: PathBuf,
        signature: PathBuf,

        /// Strong hash, defaults to the config file then XXH64
        #[arg(long, value_parser = PossibleValuesParser::new(HASH_ALGORITHMS.iter().copied()))]
        hash: Option<String>,

        /// Rolling checksum, defaults to the config file then Adler32
        #[arg(long, value_parser = PossibleValuesParser::new(CHECKSUM_ALGORITHMS.iter().copied()))]
        checksum: Option<String>,

        /// Chunk size in bytes
        #[arg(long)]
        chunk_size: Option<usize>,
    },

    /// Rebuild a file from a basis file and a delta
    Patch {
        basis: PathBuf,
        delta: PathBuf,
        output: PathBuf,

        /// Don't check the result against the hash in the delta
        #[arg(long)]
        skip_verification: bool,
    },

    /// Print the header and chunk table of a signature file
    InspectSignature {
        signature: PathBuf,

        /// List every chunk, not just the summary
        #[arg(long)]
        chunks: bool,
    },
}

// Configuration
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub skip_verification: bool,
    pub signature: SignatureConfig,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct SignatureConfig {
    pub hash: String,
    pub checksum: String,
    pub chunk_size: usize,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        SignatureConfig {
            hash: "XXH64".to_string(),
            checksum: "Adler32".to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Config {
    pub fn from_toml(data: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(data)
    }

    /// Defaults unless a config file was given
    pub fn load(path: Option<&Path>) -> Result<Config, Box<dyn Error>> {
        match path {
            None => Ok(Config::default()),
            Some(path) => {
                let data = fs::read_to_string(path)
                    .map_err(|e| format!("can't read config {}: {}", path.display(), e))?;
                Ok(Config::from_toml(&data)?)
            }
        }
    }
}

#[cfg(test)]
mod test_config {
    use super::*;

    #[test]
    fn empty_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn full_config() {
        let config = Config::from_toml(
            r#"
            skip_verification = true

            [signature]
                hash = "BLAKE3"
                checksum = "Adler32V2"
                chunk_size = 4096
            "#,
        )
        .unwrap();

        assert!(config.skip_verification);
        assert_eq!(config.signature.hash, "BLAKE3");
        assert_eq!(config.signature.checksum, "Adler32V2");
        assert_eq!(config.signature.chunk_size, 4096);
    }

    #[test]
    fn partial_signature_section() {
        let config = Config::from_toml("[signature]\nchunk_size = 512\n").unwrap();

        assert!(!config.skip_verification);
        assert_eq!(config.signature.hash, "XXH64");
        assert_eq!(config.signature.chunk_size, 512);
    }

    #[test]
    fn wrong_type() {
        assert!(Config::from_toml("skip_verification = \"yes\"").is_err());
    }

    #[test]
    fn cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::try_parse_from(["rdelta", "patch", "a", "b", "c", "--skip-verification"]).unwrap();
        assert!(matches!(cli.command, Commands::Patch { skip_verification: true, .. }));

        let cli = Cli::try_parse_from(["rdelta", "signature", "a", "b", "--hash", "BLAKE3"]).unwrap();
        assert!(matches!(cli.command, Commands::Signature { hash: Some(ref h), .. } if h == "BLAKE3"));
        assert!(Cli::try_parse_from(["rdelta", "signature", "a", "b", "--hash", "MD5"]).is_err());
    }
}
