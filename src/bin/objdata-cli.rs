//! objdata-cli - Command-line interface for object data files
//!
//! Inspects object files, extracts their decoded chunk payload, and re-encodes
//! them with a different chunk encoding.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use rct_objdata::{ChunkEncoding, ObjectRecord};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "objdata-cli")]
#[command(about = "A CLI tool for inspecting and re-encoding object data files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show header, encoding and checksum information
    Info {
        /// Object files to inspect
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Write the decoded chunk payload of an object
    Unpack {
        /// Input object file
        input: PathBuf,

        /// Output payload file
        output: PathBuf,

        /// Force overwrite of output file
        #[arg(short, long)]
        force: bool,
    },

    /// Re-encode an object's chunk and recompute its checksum
    Repack {
        /// Input object file
        input: PathBuf,

        /// Output object file
        output: PathBuf,

        /// Chunk encoding to write
        #[arg(short, long, value_enum, default_value_t = CliEncoding::RleCompressed)]
        encoding: CliEncoding,

        /// Force overwrite of output file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum CliEncoding {
    /// Store the payload verbatim
    Raw,
    /// Run-length encoding
    Rle,
    /// Back-references followed by run-length encoding - Default
    RleCompressed,
    /// Per-byte bit rotation
    Rotate,
}

impl From<CliEncoding> for ChunkEncoding {
    fn from(encoding: CliEncoding) -> Self {
        match encoding {
            CliEncoding::Raw => ChunkEncoding::Raw,
            CliEncoding::Rle => ChunkEncoding::Rle,
            CliEncoding::RleCompressed => ChunkEncoding::RleCompressed,
            CliEncoding::Rotate => ChunkEncoding::Rotate,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let result = match cli.command {
        Commands::Info { inputs } => show_info(&inputs, cli.verbose, cli.quiet),
        Commands::Unpack {
            input,
            output,
            force,
        } => unpack_file(&input, &output, force, cli.quiet),
        Commands::Repack {
            input,
            output,
            encoding,
            force,
        } => repack_file(&input, &output, encoding.into(), force, cli.quiet),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn check_paths(input: &Path, output: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }

    if output.exists() && !force {
        return Err(format!(
            "Output file '{}' already exists. Use --force to overwrite",
            output.display()
        )
        .into());
    }

    Ok(())
}

fn load_object(input: &Path) -> Result<ObjectRecord, Box<dyn std::error::Error>> {
    let bytes = fs::read(input)?;
    debug!("read {} ({} bytes)", input.display(), bytes.len());
    ObjectRecord::from_bytes(&bytes)
        .map_err(|e| format!("Failed to read '{}': {}", input.display(), e).into())
}

fn show_info(
    inputs: &[PathBuf],
    verbose: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Show progress bar for batches
    let progress = if !quiet && inputs.len() > 1 {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut failures = 0;
    for input in inputs {
        let report = describe_object(input, verbose);
        match (&progress, report) {
            (Some(pb), Ok(text)) => pb.println(text),
            (None, Ok(text)) => println!("{text}"),
            (_, Err(e)) => {
                // Skip the broken object and keep going
                failures += 1;
                warn!("{}: {}", input.display(), e);
            }
        }
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message(format!("{} objects, {} failed", inputs.len(), failures));
    }

    if failures == inputs.len() {
        return Err("No object could be read".into());
    }
    Ok(())
}

fn describe_object(input: &Path, verbose: bool) -> Result<String, Box<dyn std::error::Error>> {
    let object = load_object(input)?;
    let computed = object.computed_checksum()?;

    let type_str = object
        .header
        .object_type()
        .map_or_else(|| "Unknown".to_string(), |t| format!("{t:?}"));
    let source_str = object
        .header
        .source()
        .map_or_else(|| "Unknown".to_string(), |s| format!("{s:?}"));

    let mut text = format!(
        "{}:\n  Name: {}\n  Type: {} (source: {})\n  Encoding: {}\n  Chunk: {} bytes encoded, {} bytes decoded\n  Checksum: {:08X} ({})",
        input.display(),
        object.header.name,
        type_str,
        source_str,
        object.chunk.encoding.name(),
        object.chunk.chunk_size,
        object.data.len(),
        object.header.checksum,
        if computed == object.header.checksum {
            "✓ valid".to_string()
        } else {
            format!("✗ expected {computed:08X}")
        }
    );

    if verbose {
        text.push_str(&format!("\n  Flags: {:08X}", object.header.flags));
    }

    Ok(text)
}

fn unpack_file(
    input: &Path,
    output: &Path,
    force: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    check_paths(input, output, force)?;

    let start_time = Instant::now();
    let object = load_object(input)?;
    fs::write(output, &object.data)?;

    if !quiet {
        println!("✓ Unpack successful!");
        println!("  Encoding: {}", object.chunk.encoding.name());
        println!("  Encoded:  {} bytes", object.chunk.chunk_size);
        println!("  Decoded:  {} bytes", object.data.len());
        println!("  Time:     {:.2?}", start_time.elapsed());
    }

    Ok(())
}

fn repack_file(
    input: &Path,
    output: &Path,
    encoding: ChunkEncoding,
    force: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    check_paths(input, output, force)?;

    let start_time = Instant::now();
    let mut object = load_object(input)?;
    let previous = (object.chunk.encoding, object.chunk.chunk_size);

    object.chunk.encoding = encoding;
    let bytes = object.to_bytes()?;
    fs::write(output, &bytes)?;

    if !quiet {
        println!("✓ Repack successful!");
        println!("  Before:   {} ({} bytes)", previous.0.name(), previous.1);
        println!(
            "  After:    {} ({} bytes)",
            object.chunk.encoding.name(),
            object.chunk.chunk_size
        );
        println!("  Checksum: {:08X}", object.header.checksum);
        println!("  Time:     {:.2?}", start_time.elapsed());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rct_objdata::ObjectHeader;
    use tempfile::tempdir;

    #[test]
    fn test_repack_and_unpack() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let original_path = dir.path().join("ORIGINAL.DAT");
        let repacked_path = dir.path().join("REPACKED.DAT");
        let payload_path = dir.path().join("payload.bin");

        // Create test object
        let payload = b"Scenery payload scenery payload \x00\x00\x00\x00".to_vec();
        let mut object = ObjectRecord::new(
            ObjectHeader::new(0x81, "SCENERY"),
            ChunkEncoding::Raw,
            payload.clone(),
        );
        fs::write(&original_path, object.to_bytes()?)?;

        // Repack
        repack_file(
            &original_path,
            &repacked_path,
            ChunkEncoding::RleCompressed,
            false,
            true,
        )?;

        // Unpack
        unpack_file(&repacked_path, &payload_path, false, true)?;

        // Verify
        assert_eq!(fs::read(&payload_path)?, payload);
        let repacked = ObjectRecord::from_bytes(&fs::read(&repacked_path)?)?;
        assert_eq!(repacked.chunk.encoding, ChunkEncoding::RleCompressed);
        assert_eq!(repacked.header.checksum, object.header.checksum);

        // Refuses to overwrite without force
        assert!(unpack_file(&repacked_path, &payload_path, false, true).is_err());

        Ok(())
    }

    #[test]
    fn test_describe_reports_checksum() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("WATER.DAT");
        let mut object = ObjectRecord::new(
            ObjectHeader::new(0x89, "WATER"),
            ChunkEncoding::Rle,
            vec![1, 1, 1, 2],
        );
        fs::write(&path, object.to_bytes()?)?;

        let text = describe_object(&path, true)?;
        assert!(text.contains("Type: Water (source: Base)"));
        assert!(text.contains("✓ valid"));
        Ok(())
    }
}
