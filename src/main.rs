//! huffman-text command line
//!
//! ## Usage
//!
//! ```bash
//! # Writes lorem_encoded.txt
//! huffman-text encode lorem.txt
//!
//! # Writes lorem_encoded_decoded.txt
//! huffman-text decode lorem_encoded.txt
//!
//! # Explicit output, tolerate a truncated payload
//! huffman-text decode lorem_encoded.txt --output lorem.txt --discard-trailing-bits
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use huffman_text::{CodecOptions, HuffmanCodec, TrailingBits};

#[derive(Parser, Debug)]
#[command(name = "huffman-text")]
#[command(version)]
#[command(about = "Huffman encode files into a text code table and '0'/'1' payload", long_about = None)]
struct Args {
    #[command(subcommand)]
    mode: Mode,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Read/write buffer size in bytes
    #[arg(long, default_value = "65536", global = true)]
    buffer_size: usize,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Encode a file into <stem>_encoded.txt
    Encode {
        input: PathBuf,

        /// Write here instead of the derived name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode a file into <stem>_decoded.txt
    Decode {
        input: PathBuf,

        /// Write here instead of the derived name
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Drop undecodable bits at the end instead of failing
        #[arg(long)]
        discard_trailing_bits: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set tracing subscriber: {e}");
    }

    let options = CodecOptions::default().with_buffer_capacity(args.buffer_size);

    let result = match args.mode {
        Mode::Encode { input, output } => {
            let mut codec = HuffmanCodec::with_options(options);
            match output {
                Some(output) => codec.encode_file_to(&input, &output).map(|_| output),
                None => codec.encode_file(&input),
            }
            .map(|path| ("Encoding", path))
        }
        Mode::Decode {
            input,
            output,
            discard_trailing_bits,
        } => {
            let trailing = if discard_trailing_bits {
                TrailingBits::Discard
            } else {
                TrailingBits::Reject
            };
            let mut codec = HuffmanCodec::with_options(options.with_trailing_bits(trailing));
            match output {
                Some(output) => codec.decode_file_to(&input, &output).map(|_| output),
                None => codec.decode_file(&input),
            }
            .map(|path| ("Decoding", path))
        }
    };

    match result {
        Ok((action, path)) => {
            println!("{} complete: {}", action, path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
