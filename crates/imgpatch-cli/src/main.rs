//! imgsearch: find a byte pattern in device images and raw streams.
//!
//! Prints one line per match, `<name>: 0x<offset>`, with the offset as 16
//! zero-padded hex digits. Exits 0 only when every input was searched
//! without an I/O error; per-input failures go to standard error and the
//! remaining inputs are still processed.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use imgpatch_io::{File, FileSearcher, FsBackend, OpenFlags, ReadBackend, Whence, retry};

/// Search files or standard input for a byte pattern.
#[derive(Parser)]
#[command(name = "imgsearch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Pattern as hex digits (e.g. "7f454c46"); whitespace is ignored.
    #[arg(
        short = 'x',
        long,
        value_name = "HEX",
        conflicts_with = "text",
        required_unless_present = "text"
    )]
    hex: Option<String>,

    /// Pattern as literal text.
    #[arg(short, long, value_name = "STRING")]
    text: Option<String>,

    /// Stop after this many matches per input.
    #[arg(short = 'n', long, value_name = "COUNT")]
    limit: Option<u64>,

    /// Ignore matches before this byte offset.
    #[arg(long, value_name = "OFFSET", default_value_t = 0)]
    start: u64,

    /// Ignore matches at or past this byte offset.
    #[arg(long, value_name = "OFFSET")]
    end: Option<u64>,

    /// Files to search; standard input when none are given.
    paths: Vec<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let pattern = match pattern_bytes(&cli) {
        Ok(pattern) => pattern,
        Err(err) => {
            eprintln!("imgsearch: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(pattern_len = pattern.len(), inputs = cli.paths.len(), "starting search");

    let mut failed = false;
    if cli.paths.is_empty() {
        if let Err(err) = search_stdin(&cli, &pattern) {
            eprintln!("imgsearch: (stdin): {err:#}");
            failed = true;
        }
    } else {
        for path in &cli.paths {
            if let Err(err) = search_path(&cli, &pattern, path) {
                eprintln!("imgsearch: {}: {err:#}", path.display());
                failed = true;
            }
        }
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn pattern_bytes(cli: &Cli) -> Result<Vec<u8>> {
    if let Some(hex) = &cli.hex {
        return decode_hex(hex);
    }
    if let Some(text) = &cli.text {
        return Ok(text.clone().into_bytes());
    }
    bail!("a pattern is required (--hex or --text)")
}

fn decode_hex(input: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = input
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if digits.is_empty() {
        bail!("empty hex pattern");
    }
    if digits.len() % 2 != 0 {
        bail!("hex pattern has an odd number of digits");
    }
    digits
        .chunks(2)
        .map(|pair| Ok(hex_digit(pair[0])? << 4 | hex_digit(pair[1])?))
        .collect()
}

fn hex_digit(byte: u8) -> Result<u8> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        _ => bail!("invalid hex digit {:?}", char::from(byte)),
    }
}

fn search_path(cli: &Cli, pattern: &[u8], path: &Path) -> Result<()> {
    let mut file = File::new(FsBackend::new(path, OpenFlags::read_only()));
    file.open().context("open")?;
    if cli.start > 0 {
        let offset = i64::try_from(cli.start).context("start offset exceeds the seek domain")?;
        file.seek(offset, Whence::Set)
            .context("seek to start offset")?;
    }
    report_matches(&path.display().to_string(), cli, pattern, &mut file)
}

fn search_stdin(cli: &Cli, pattern: &[u8]) -> Result<()> {
    let mut file = File::new(ReadBackend::new(std::io::stdin().lock()));
    file.open()?;
    if cli.start > 0 {
        skip_bytes(&mut file, cli.start).context("skip to start offset")?;
    }
    report_matches("(stdin)", cli, pattern, &mut file)
}

/// Consumes `count` bytes from an unseekable stream.
fn skip_bytes(file: &mut File, count: u64) -> Result<()> {
    let mut scratch = [0u8; 4096];
    let mut left = count;
    while left > 0 {
        let want = scratch.len().min(usize::try_from(left).unwrap_or(scratch.len()));
        let n = retry::read_retry(file, &mut scratch[..want])?;
        if n == 0 {
            break; // stream shorter than the start offset
        }
        left -= n as u64;
    }
    Ok(())
}

fn report_matches(name: &str, cli: &Cli, pattern: &[u8], file: &mut File) -> Result<()> {
    let mut searcher = FileSearcher::new(file, pattern.to_vec());
    let mut found = 0u64;
    while let Some(relative) = searcher.next_match()? {
        let offset = cli
            .start
            .checked_add(relative)
            .context("match offset exceeds the 64-bit domain")?;
        if cli.end.is_some_and(|end| offset >= end) {
            break;
        }
        println!("{name}: 0x{offset:016x}");
        found += 1;
        if cli.limit.is_some_and(|cap| found >= cap) {
            break;
        }
    }
    Ok(())
}
