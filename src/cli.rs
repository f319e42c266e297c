use std::ffi::{OsStr, OsString};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use log::{info, warn, LevelFilter};
use thiserror::Error;

use huffpress::container::{self, Header};
use huffpress::files::{self, COMPRESSED_EXTENSION};
use huffpress::{HuffmanCodec, HuffmanError};

pub const USAGE: &str = "\
Usage:
  huffpress [compress|decompress] [FILE] [options]

Options:
  -o, --output PATH   write to PATH instead of the default name
      --raw           compress without a header (cannot be decompressed)
      --codes         print the code table
  -v, --verbose       more log output (-vv, -vvv for more)
  -q, --quiet         only log errors
  -h, --help          show this message
  -V, --version       show the version

Without FILE the file name is read from standard input.
Without a command, FILE ending in .huff is decompressed, anything else compressed.";

#[derive(Error, Debug)]
pub enum CliError {
    #[error("unknown option `{0}`")]
    UnknownOption(String),

    #[error("`{0}` needs a value")]
    MissingValue(&'static str),

    #[error("unexpected argument `{0}`")]
    UnexpectedArgument(String),

    #[error("--raw only applies to compress")]
    RawDecompress,

    #[error("no file name given")]
    NoFileName,

    #[error(transparent)]
    Huffman(#[from] HuffmanError),
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Huffman(err.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Compress,
    Decompress,
}

impl Command {
    fn verb(self) -> &'static str {
        match self {
            Command::Compress => "compress",
            Command::Decompress => "decompress",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub command: Command,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub raw: bool,
    pub print_codes: bool,
    pub log_level: LevelFilter,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    Run(Config),
    Help,
    Version,
}

impl Config {
    pub fn from_args<I, S>(args: I) -> Result<Invocation, CliError>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut command = None;
        let mut input: Option<PathBuf> = None;
        let mut output = None;
        let mut raw = false;
        let mut print_codes = false;
        let mut quiet = false;
        let mut verbosity = 0usize;

        let mut args = args.into_iter().map(Into::<OsString>::into);
        while let Some(arg) = args.next() {
            match arg.to_str() {
                Some("-h" | "--help") => return Ok(Invocation::Help),
                Some("-V" | "--version") => return Ok(Invocation::Version),
                Some("-o" | "--output") => {
                    let value = args.next().ok_or(CliError::MissingValue("--output"))?;
                    output = Some(PathBuf::from(value));
                }
                Some("--raw") => raw = true,
                Some("--codes") => print_codes = true,
                Some("-q" | "--quiet") => quiet = true,
                Some("--verbose") => verbosity += 1,
                Some(flag) if flag.len() > 1 && flag.starts_with("-v") && flag[1..].bytes().all(|b| b == b'v') => {
                    verbosity += flag.len() - 1;
                }
                Some(flag) if flag.starts_with('-') && flag.len() > 1 => {
                    return Err(CliError::UnknownOption(flag.to_string()));
                }
                Some("compress" | "c") if command.is_none() && input.is_none() => {
                    command = Some(Command::Compress);
                }
                Some("decompress" | "d") if command.is_none() && input.is_none() => {
                    command = Some(Command::Decompress);
                }
                _ if input.is_none() => input = Some(PathBuf::from(&arg)),
                _ => {
                    return Err(CliError::UnexpectedArgument(
                        arg.to_string_lossy().into_owned(),
                    ))
                }
            }
        }

        let command = command.unwrap_or(match &input {
            Some(path) if path.extension() == Some(OsStr::new(COMPRESSED_EXTENSION)) => {
                Command::Decompress
            }
            _ => Command::Compress,
        });
        if raw && command == Command::Decompress {
            return Err(CliError::RawDecompress);
        }

        let log_level = match (quiet, verbosity) {
            (true, _) => LevelFilter::Error,
            (false, 0) => LevelFilter::Warn,
            (false, 1) => LevelFilter::Info,
            (false, 2) => LevelFilter::Debug,
            (false, _) => LevelFilter::Trace,
        };

        Ok(Invocation::Run(Config {
            command,
            input,
            output,
            raw,
            print_codes,
            log_level,
        }))
    }
}

/// Runs one compress or decompress job. Prompts on `stdin` for the file name
/// when none was given; status lines go to `stdout`.
pub fn run<R: BufRead, W: Write>(config: &Config, stdin: &mut R, stdout: &mut W) -> Result<(), CliError> {
    let input = match &config.input {
        Some(path) => path.clone(),
        None => prompt_for_file(config.command, stdin, stdout)?,
    };

    match config.command {
        Command::Compress => compress_file(config, &input, stdout),
        Command::Decompress => decompress_file(config, &input, stdout),
    }
}

fn prompt_for_file<R: BufRead, W: Write>(
    command: Command,
    stdin: &mut R,
    stdout: &mut W,
) -> Result<PathBuf, CliError> {
    write!(stdout, "Enter the name of the file to {}: ", command.verb())?;
    stdout.flush()?;

    let mut line = String::new();
    stdin.read_line(&mut line)?;
    let name = line.trim();
    if name.is_empty() {
        return Err(CliError::NoFileName);
    }
    Ok(PathBuf::from(name))
}

fn compress_file<W: Write>(config: &Config, input: &Path, stdout: &mut W) -> Result<(), CliError> {
    let data = files::read_bytes(input)?;
    let codec = HuffmanCodec::from_data(&data)?;

    if config.print_codes {
        writeln!(stdout, "{}", codec.codes())?;
    }

    let compressed = if config.raw {
        warn!("raw output carries no header and cannot be decompressed");
        codec.compress_raw(&data)?
    } else {
        container::compress_with(&codec, &data)?
    };

    let destination = config
        .output
        .clone()
        .unwrap_or_else(|| files::compressed_path(input));
    files::write_bytes(&destination, &compressed)?;
    info!(
        "{} symbols, longest code {} bits",
        codec.codes().len(),
        codec.codes().max_code_length()
    );

    writeln!(
        stdout,
        "File compressed successfully. Compressed file: {}",
        destination.display()
    )?;
    writeln!(
        stdout,
        "{} bytes -> {} bytes ({:.1}% of original)",
        data.len(),
        compressed.len(),
        percent(compressed.len(), data.len())
    )?;
    Ok(())
}

fn decompress_file<W: Write>(config: &Config, input: &Path, stdout: &mut W) -> Result<(), CliError> {
    let compressed = files::read_bytes(input)?;
    let data = container::decompress(&compressed)?;

    if config.print_codes {
        let header = Header::read_from(&mut compressed.as_slice())?;
        let codec = HuffmanCodec::from_frequencies(header.frequencies)?;
        writeln!(stdout, "{}", codec.codes())?;
    }

    let destination = config
        .output
        .clone()
        .unwrap_or_else(|| files::decompressed_path(input));
    files::write_bytes(&destination, &data)?;

    writeln!(
        stdout,
        "File decompressed successfully. Decompressed file: {}",
        destination.display()
    )?;
    writeln!(stdout, "{} bytes -> {} bytes", compressed.len(), data.len())?;
    Ok(())
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}
