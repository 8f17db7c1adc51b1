use std::error::Error;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::process;

use clap::Parser;
use log::{debug, error, info};

use rcore::progress::ProgressReport;
use rcore::registry::{create_checksum, create_hash};
use rpatch::{BinaryDeltaReader, DeltaApplier};
use rsig::{SignatureBuilder, SignatureReader};

mod cli;
use crate::cli::Cli;
use crate::cli::Commands;
use crate::cli::Config;

fn main() {
    // Parse the cli
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&cli) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = Config::load(cli.config.as_deref())?;
    debug!("CONFIG: {:?}", config);

    match &cli.command {
        Commands::Signature {
            basis,
            signature,
            hash,
            checksum,
            chunk_size,
        } => {
            let hash = create_hash(hash.as_deref().unwrap_or(&config.signature.hash))?;
            let checksum = create_checksum(checksum.as_deref().unwrap_or(&config.signature.checksum))?;
            let chunk_size = chunk_size.unwrap_or(config.signature.chunk_size);

            let builder = SignatureBuilder::new()
                .hash_algorithm(hash)
                .rolling_checksum(checksum)
                .chunk_size(chunk_size)?
                .with_progress(progress_logger("Building signature"));

            // Only touch the output once every argument checked out
            let mut basis_file = File::open(basis)?;
            let mut out = File::create(signature)?;

            let count = builder.build(&mut basis_file, &mut out)?;
            out.sync_all()?;

            info!("Wrote {} chunks to {}", count, signature.display());
        }
        Commands::Patch {
            basis,
            delta,
            output,
            skip_verification,
        } => {
            if same_file(basis, output) {
                return Err("the basis and output must be different files".into());
            }

            let mut basis_file = BufReader::new(File::open(basis)?);
            let mut delta_source = BinaryDeltaReader::new(File::open(delta)?)?;
            let mut output_file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(output)?;

            let skip = *skip_verification || config.skip_verification;
            DeltaApplier::new()
                .skip_verification(skip)
                .apply(&mut basis_file, &mut delta_source, &mut output_file)?;
            output_file.sync_all()?;

            if skip {
                info!("Patched {} (verification skipped)", output.display());
            } else {
                info!("Patched and verified {}", output.display());
            }
        }
        Commands::InspectSignature { signature, chunks } => {
            let sig = SignatureReader::new(BufReader::new(File::open(signature)?))
                .with_progress(progress_logger("Reading signature"))
                .read_signature()?;

            let stdout = std::io::stdout();
            let mut out = BufWriter::new(stdout.lock());

            writeln!(out, "Hash algorithm:    {}", sig.hash_algorithm().name())?;
            writeln!(out, "Rolling checksum:  {}", sig.rolling_checksum().name())?;
            writeln!(out, "Chunks:            {}", sig.len())?;
            writeln!(out, "Basis length:      {}", sig.basis_length())?;

            if *chunks {
                for c in sig.chunks() {
                    writeln!(
                        out,
                        "{:>12} {:>6} {:08x} {}",
                        c.start_offset,
                        c.length,
                        c.rolling_checksum,
                        hex::encode(&c.hash)
                    )?;
                }
            }
            out.flush()?;
        }
    }
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

// Log once per 10% step instead of on every record
fn progress_logger(what: &'static str) -> impl FnMut(ProgressReport) {
    let mut last_step = None;

    move |report: ProgressReport| {
        if report.total == 0 {
            return;
        }

        let step = report.current_position * 10 / report.total;
        if last_step != Some(step) {
            last_step = Some(step);
            debug!(
                "{}: {}/{} bytes ({}%)",
                what,
                report.current_position,
                report.total,
                step * 10
            );
        }
    }
}
