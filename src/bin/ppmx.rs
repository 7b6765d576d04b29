//! ppmx CLI
//!
//! Command-line interface for ppmx compression.

use clap::{Parser, Subcommand};
use ppmx::{EntropyEstimator, PpmCodec, PpmConfig};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "ppmx")]
#[command(author = "Moroya Sakamoto")]
#[command(version = "1.0.0")]
#[command(about = "Adaptive PPM compression with arithmetic coding")]
#[command(long_about = r#"
ppmx: PPM + Arithmetic Coding Compression

Principle:
  Input Byte → Context Model P(next | last k bytes)
    → Predicted well → fraction of a bit
    → Never seen     → escape to a shorter context, pay for the surprise

The compressed stream is raw bits: no header, no tables. Decompression
must use the same model order as compression.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file
    Compress {
        /// Input file (use - for stdin)
        input: PathBuf,

        /// Output file (default: input.ppmx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Model order (-1 to 16); higher orders cost memory
        #[arg(long, default_value_t = 3, allow_hyphen_values = true)]
        order: i32,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Decompress a file
    Decompress {
        /// Input file (.ppmx)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Model order used at compression time
        #[arg(long, default_value_t = 3, allow_hyphen_values = true)]
        order: i32,
    },

    /// Estimate compression for a file
    Estimate {
        /// Input file
        input: PathBuf,

        /// Show detailed output
        #[arg(short, long)]
        detailed: bool,
    },

    /// Verify a compressed file by decompressing it
    Verify {
        /// Input file (.ppmx)
        input: PathBuf,

        /// Model order used at compression time
        #[arg(long, default_value_t = 3, allow_hyphen_values = true)]
        order: i32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compress {
            input,
            output,
            order,
            verbose,
        } => {
            compress_file(&input, output, order, verbose)?;
        }
        Commands::Decompress {
            input,
            output,
            order,
        } => {
            decompress_file(&input, output, order)?;
        }
        Commands::Estimate { input, detailed } => {
            estimate_compression(&input, detailed)?;
        }
        Commands::Verify { input, order } => {
            verify_file(&input, order)?;
        }
    }

    Ok(())
}

fn compress_file(
    input: &PathBuf,
    output: Option<PathBuf>,
    order: i32,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Read input
    let data = if input.to_string_lossy() == "-" {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer)?;
        buffer
    } else {
        fs::read(input)?
    };

    let original_size = data.len();

    // Compress
    let start = Instant::now();
    let mut codec = PpmCodec::new(PpmConfig::new(order))?;
    let compressed = codec.compress(&data)?;
    let elapsed = start.elapsed();

    let compressed_size = compressed.len();

    // Write output
    let output_path = output.unwrap_or_else(|| {
        let mut p = input.clone();
        p.set_extension("ppmx");
        p
    });

    fs::write(&output_path, &compressed)?;

    // Report
    let ratio = compressed_size as f64 / original_size.max(1) as f64 * 100.0;
    let savings = 100.0 - ratio;

    if verbose {
        println!("ppmx Compression");
        println!("================");
        println!("Input:      {}", input.display());
        println!("Output:     {}", output_path.display());
        println!("Order:      {}", order);
        println!();
        println!("Original:   {} bytes", original_size);
        println!("Compressed: {} bytes", compressed_size);
        println!("Ratio:      {:.1}%", ratio);
        println!("Savings:    {:.1}%", savings);
        println!("Time:       {:.2}ms", elapsed.as_secs_f64() * 1000.0);
    } else {
        println!(
            "{} -> {} ({:.1}% ratio, {:.1}% saved)",
            input.display(),
            output_path.display(),
            ratio,
            savings
        );
    }

    Ok(())
}

fn decompress_file(
    input: &PathBuf,
    output: Option<PathBuf>,
    order: i32,
) -> Result<(), Box<dyn std::error::Error>> {
    let codec = PpmCodec::new(PpmConfig::new(order))?;
    let reader = BufReader::new(File::open(input)?);

    if let Some(output_path) = output {
        let writer = BufWriter::new(File::create(&output_path)?);
        let bytes = codec.decompress_from(reader, writer)?;
        println!("Decompressed {} bytes to: {}", bytes, output_path.display());
    } else {
        let stdout = io::stdout();
        codec.decompress_from(reader, BufWriter::new(stdout.lock()))?;
    }

    Ok(())
}

fn estimate_compression(input: &PathBuf, detailed: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let original_size = data.len();

    let estimator = EntropyEstimator::new();
    let estimate = estimator.estimate(&data);

    println!("Compression Estimate for: {}", input.display());
    println!("==========================");
    println!("Original Size:    {} bytes", original_size);
    println!("Estimated Size:   {} bytes", estimate.estimated_size);
    println!("Estimated Ratio:  {:.1}%", estimate.estimated_ratio * 100.0);
    println!("Space Savings:    {:.1}%", estimate.space_savings * 100.0);
    println!("Quality:          {}", estimate.quality());
    println!(
        "Compressible:     {}",
        if estimate.is_compressible() {
            "Yes"
        } else {
            "No"
        }
    );

    if detailed {
        println!();
        println!("Detailed Analysis:");
        println!(
            "  Shannon Entropy:   {:.2} bits/byte",
            estimate.shannon_entropy
        );
        println!("  Repetition Score:  {:.2}", estimate.repetition_score);
        println!("  Unique Bytes:      {}", estimate.unique_bytes);
    }

    Ok(())
}

fn verify_file(input: &PathBuf, order: i32) -> Result<(), Box<dyn std::error::Error>> {
    let codec = PpmCodec::new(PpmConfig::new(order))?;
    let compressed = fs::read(input)?;

    print!("Verifying {}... ", input.display());
    io::stdout().flush()?;

    match codec.decompress(&compressed) {
        Ok(data) => {
            println!("OK ({} bytes decompressed)", data.len());
        }
        Err(e) => {
            println!("FAILED");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
