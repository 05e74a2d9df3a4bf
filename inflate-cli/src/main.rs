use std::fs;
use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{error, info};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Sniff the 2-byte GZIP magic number; falls back to raw DEFLATE.
    Auto,
    Deflate,
    Gzip,
}

#[derive(Parser, Debug)]
#[command(name = "inflate", about = "Decompress a DEFLATE or GZIP file")]
struct Args {
    /// Compressed input file.
    source: String,

    /// Destination for the decompressed bytes.
    destination: String,

    #[arg(long, value_enum, default_value_t = Format::Auto)]
    format: Format,
}

fn run(args: &Args) -> Result<(), String> {
    let buffer = fs::read(&args.source).map_err(|e| format!("could not read {}: {e}", args.source))?;

    let format = match args.format {
        Format::Auto if buffer.starts_with(&[0x1F, 0x8B]) => Format::Gzip,
        Format::Auto => Format::Deflate,
        other => other,
    };

    let decompressed = match format {
        Format::Gzip => {
            let mut src = buffer.as_slice();
            gzip::decompress(&mut src).map_err(|e| e.to_string())?
        }
        Format::Deflate => {
            let mut src = buffer.as_slice();
            deflate::decompress_to_vec(&mut src).map_err(|e| e.to_string())?
        }
        Format::Auto => unreachable!("resolved above"),
    };
    info!("decompressed {} bytes into {}", decompressed.len(), args.destination);

    let mut out_file =
        fs::File::create(&args.destination).map_err(|e| format!("could not create {}: {e}", args.destination))?;
    out_file
        .write_all(&decompressed)
        .map_err(|e| format!("could not write {}: {e}", args.destination))?;
    Ok(())
}

fn main() -> ExitCode {
    simple_logger::SimpleLogger::new().init().ok();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}
