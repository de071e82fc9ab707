//! CLI for building and serializing OpenTSDB data points.
//!
//! Provides commands for encoding a single datum from flags, converting
//! newline-delimited JSON datums to lines, and benchmarking serialization.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tsdatum::{Datum, Timestamp};

/// tsdatum: build and serialize OpenTSDB data points.
#[derive(Parser)]
#[command(name = "tsdatum", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Serialize a single datum given on the command line.
    Encode {
        /// Metric name (e.g., "cpu.utilization").
        #[arg(long)]
        metric: String,

        /// Epoch seconds or milliseconds, an absolute or relative time, or "now".
        #[arg(long, default_value = "now")]
        timestamp: String,

        /// Datum value.
        #[arg(long, allow_negative_numbers = true)]
        value: f64,

        /// Tag as name=value; may be repeated.
        #[arg(long = "tag", value_parser = parse_tag, required = true)]
        tags: Vec<(String, String)>,
    },

    /// Convert newline-delimited JSON datums to lines.
    Convert {
        /// Input file (defaults to stdin).
        input: Option<PathBuf>,

        /// Tag applied to every record unless the record sets it; may be repeated.
        #[arg(long = "tag", value_parser = parse_tag)]
        tags: Vec<(String, String)>,

        /// Log and skip invalid records instead of failing.
        #[arg(long)]
        skip_invalid: bool,
    },

    /// Run a serialization microbenchmark with one reused datum.
    Bench {
        /// Number of lines to produce.
        #[arg(long, default_value = "1000000")]
        points: u64,

        /// Number of tags on the datum.
        #[arg(long, default_value = "2")]
        tags: u32,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Encode {
            metric,
            timestamp,
            value,
            tags,
        } => cmd_encode(&metric, &timestamp, value, &tags),
        Commands::Convert {
            input,
            tags,
            skip_invalid,
        } => cmd_convert(input.as_deref(), &tags, skip_invalid),
        Commands::Bench { points, tags } => cmd_bench(points, tags),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Implements `tsdatum encode`.
fn cmd_encode(
    metric: &str,
    timestamp: &str,
    value: f64,
    tags: &[(String, String)],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut datum = Datum::new();
    datum
        .set_metric(metric)
        .set_timestamp(parse_timestamp(timestamp))?
        .set_value(value)?;
    for (name, value) in tags {
        datum.set_tag(name.as_str(), value.as_str());
    }

    println!("{}", datum.to_line()?);
    Ok(())
}

/// Implements `tsdatum convert [input]`.
fn cmd_convert(
    input: Option<&Path>,
    tags: &[(String, String)],
    skip_invalid: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(File::open(path).map_err(|e| {
            format!("failed to open '{}': {e}", path.display())
        })?)),
        None => Box::new(io::stdin().lock()),
    };

    let mut defaults = Datum::new();
    for (name, value) in tags {
        defaults.set_tag(name.as_str(), value.as_str());
    }

    let mut out = BufWriter::new(io::stdout().lock());
    let (converted, skipped) = convert_lines(reader, &mut out, &defaults, skip_invalid)?;
    out.flush()?;
    tracing::info!(converted, skipped, "conversion finished");
    Ok(())
}

/// Converts every non-blank record from `reader`, writing one line each to `out`.
///
/// Line numbers in errors count blank lines too. Returns the number of
/// converted and skipped records.
fn convert_lines<R: BufRead, W: Write>(
    reader: R,
    out: &mut W,
    defaults: &Datum,
    skip_invalid: bool,
) -> Result<(u64, u64), Box<dyn std::error::Error>> {
    let mut buf = String::new();
    let mut converted = 0u64;
    let mut skipped = 0u64;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let line_no = index + 1;

        buf.clear();
        match convert_record(defaults, &line, &mut buf) {
            Ok(()) => {
                buf.push('\n');
                out.write_all(buf.as_bytes())?;
                converted += 1;
            }
            Err(e) if skip_invalid => {
                tracing::warn!(line = line_no, "skipping invalid record: {e}");
                skipped += 1;
            }
            Err(e) => return Err(format!("line {line_no}: {e}").into()),
        }
    }

    Ok((converted, skipped))
}

/// Builds one record on top of `defaults` and appends its line to `buf`.
fn convert_record(
    defaults: &Datum,
    record: &str,
    buf: &mut String,
) -> Result<(), Box<dyn std::error::Error>> {
    let value: serde_json::Value = serde_json::from_str(record)?;
    let mut datum = defaults.clone();
    datum.apply_json(&value)?;
    datum.write_line(buf)?;
    Ok(())
}

/// Implements `tsdatum bench`.
#[allow(clippy::cast_precision_loss)] // Benchmark stats are fine with f64 precision
fn cmd_bench(points: u64, tag_count: u32) -> Result<(), Box<dyn std::error::Error>> {
    println!("tsdatum serialization benchmark");
    println!("  Points: {points}");
    println!("  Tags: {tag_count}");
    println!();

    let mut datum = Datum::new();
    datum.set_metric("cpu.utilization");
    for i in 0..tag_count {
        datum.set_tag(format!("tag_{i}"), format!("value_{i}"));
    }

    let base_time = 1_700_000_000_000u64;
    let mut buf = String::with_capacity(256);
    let mut bytes = 0u64;

    let start = Instant::now();

    for i in 0..points {
        datum
            .set_timestamp(base_time + i % 1_000_000)?
            .set_value((i % 1000) as f64 / 10.0)?;
        buf.clear();
        datum.write_line(&mut buf)?;
        bytes += buf.len() as u64 + 1;
    }

    let elapsed = start.elapsed();
    let ns_per_line = elapsed.as_nanos() as f64 / points.max(1) as f64;
    let lines_per_sec = points as f64 / elapsed.as_secs_f64();

    println!("Results:");
    println!("  Total lines: {points}");
    println!("  Total bytes: {bytes}");
    println!("  Elapsed: {elapsed:.3?}");
    println!("  Avg latency: {ns_per_line:.1} ns/line");
    println!("  Throughput: {lines_per_sec:.0} lines/sec");
    println!();

    Ok(())
}

/// Parses a command-line timestamp: "now", an epoch number, or a time string.
fn parse_timestamp(s: &str) -> Timestamp {
    let s = s.trim();
    if s == "now" {
        return Timestamp::now_millis();
    }
    match s.parse::<u64>() {
        Ok(epoch) => Timestamp::Epoch(epoch),
        Err(_) => Timestamp::from(s),
    }
}

/// Parses a `name=value` tag argument.
fn parse_tag(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid tag '{s}': expected name=value"))?;
    if name.is_empty() {
        return Err(format!("invalid tag '{s}': empty tag name"));
    }
    Ok((name.to_string(), value.to_string()))
}
