#![forbid(unsafe_code)]
use std::io::{Read, Write};
use std::path::PathBuf;
use std::{env, ffi, fs, io, process};

use lzwpack::container::HEADER_LEN;
use lzwpack::io::{compress_file, compress_stream, decompress_file, decompress_stream, Summary};
use lzwpack::{inspect, DEFAULT_CODESIZE, MAX_CODESIZE, MIN_CODESIZE};

fn main() -> CodingResult {
    CodingResult::catch_panic(|| {
        let flags = Flags::from_args(env::args_os()).unwrap_or_else(|ParamError| explain());
        init_logging(flags.verbose);
        run_coding(flags)
    })
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("lzwpack=debug,lzw=info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_coding(flags: Flags) -> Result<(), io::Error> {
    let operation = flags.operation.unwrap_or_else(explain);
    let max_bits = if flags.max_bits < MIN_CODESIZE || flags.max_bits > MAX_CODESIZE {
        return explain();
    } else {
        flags.max_bits
    };

    match (operation, flags.input, flags.output) {
        (Operation::Encode, Input::File(file), Some(output)) => {
            let summary = compress_file(file, output, max_bits)?;
            report(&summary);
        }
        (Operation::Encode, input, output) => {
            let input = open_input(input)?;
            let summary = compress_stream(input, create_output(output)?, max_bits)?;
            report(&summary);
        }
        // The output is only created once the whole container decoded.
        (Operation::Decode, Input::File(file), Some(output)) => {
            let summary = decompress_file(file, output)?;
            report(&summary);
        }
        (Operation::Decode, input, output) => {
            let mut data = vec![];
            let summary = decompress_stream(open_input(input)?, &mut data)?;
            let mut out = create_output(output)?;
            out.write_all(&data)?;
            out.flush()?;
            report(&summary);
        }
        (Operation::Info, input, output) => {
            let mut data = vec![];
            open_input(input)?.read_to_end(&mut data)?;
            let header = inspect(&data)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            let payload = data.len() - HEADER_LEN;
            let mut out = create_output(output)?;
            writeln!(out, "original size: {}", header.original_size)?;
            writeln!(out, "code width:    {}", header.max_bits)?;
            writeln!(out, "code count:    {}", header.code_count)?;
            writeln!(out, "padding bits:  {}", header.padding_bits)?;
            writeln!(out, "payload bytes: {} (expected {})", payload, header.payload_len_hint())?;
            out.flush()?;
        }
    }

    Ok(())
}

fn open_input(input: Input) -> io::Result<Box<dyn Read>> {
    Ok(match input {
        Input::File(file) => Box::new(io::BufReader::new(fs::File::open(file)?)),
        Input::Stdin => Box::new(io::stdin()),
    })
}

fn create_output(output: Option<PathBuf>) -> io::Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(io::BufWriter::new(fs::File::create(path)?)),
        None => Box::new(io::BufWriter::new(io::stdout())),
    })
}

fn report(summary: &Summary) {
    match summary.ratio() {
        Some(ratio) => tracing::info!(
            original = summary.input_size,
            compressed = summary.output_size,
            ratio = ratio,
            "done"
        ),
        None => tracing::info!(compressed = summary.output_size, "done, empty input"),
    }
}

struct Flags {
    input: Input,
    output: Option<PathBuf>,
    operation: Option<Operation>,
    max_bits: u8,
    verbose: bool,
}

struct ParamError;

#[derive(Debug)]
enum Input {
    File(PathBuf),
    Stdin,
}

#[derive(Debug)]
enum Operation {
    Encode,
    Decode,
    Info,
}

fn explain<T>() -> T {
    println!(
        "Usage: lzw [-e|-d|-i] [-w <bits>] [-o <output>] <file>\n\
        Arguments:\n\
        -e\t operation encode\n\
        -d\t operation decode\n\
        -i\t print the container header\n\
        -w\t code width in 8..=32 (default 12)\n\
        <file>\tfilepath or '-' for stdin"
    );
    process::exit(1);
}

impl Default for Flags {
    fn default() -> Flags {
        Flags {
            input: Input::Stdin,
            output: None,
            operation: None,
            max_bits: DEFAULT_CODESIZE,
            verbose: false,
        }
    }
}

fn command() -> clap::Command<'static> {
    clap::Command::new("lzw")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compress and decompress LZW containers")
        .arg(
            clap::Arg::new("decode")
                .short('d')
                .long("decode")
                .takes_value(false),
        )
        .arg(
            clap::Arg::new("encode")
                .short('e')
                .long("encode")
                .takes_value(false),
        )
        .arg(
            clap::Arg::new("info")
                .short('i')
                .long("info")
                .takes_value(false),
        )
        .group(
            clap::ArgGroup::new("operation")
                .args(&["decode", "encode", "info"])
                .multiple(false)
                .required(true),
        )
        .arg(
            clap::Arg::new("max_bits")
                .short('w')
                .long("word-bits")
                .takes_value(true)
                .value_parser(
                    clap::value_parser!(u8)
                        .range(i64::from(MIN_CODESIZE)..=i64::from(MAX_CODESIZE)),
                ),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .takes_value(true)
                .value_parser(clap::builder::ValueParser::path_buf()),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .takes_value(false),
        )
        .arg(
            clap::Arg::new("file")
                .default_value("-")
                .value_parser(clap::builder::ValueParser::path_buf()),
        )
}

impl Flags {
    fn from_args(mut args: impl Iterator<Item = ffi::OsString>) -> Result<Self, ParamError> {
        let mut flags = Flags::default();
        let matches = command().try_get_matches_from(args.by_ref()).map_err(|_| ParamError)?;

        if matches.contains_id("decode") {
            flags.operation = Some(Operation::Decode);
        } else if matches.contains_id("encode") {
            flags.operation = Some(Operation::Encode);
        } else if matches.contains_id("info") {
            flags.operation = Some(Operation::Info);
        }

        if let Some(&m) = matches.get_one::<u8>("max_bits") {
            flags.max_bits = m;
        }

        flags.output = matches.get_one::<PathBuf>("output").cloned();
        flags.verbose = matches.contains_id("verbose");

        match matches.get_one::<PathBuf>("file") {
            None => flags.input = Input::Stdin,
            Some(p) if *p == PathBuf::from("-") => flags.input = Input::Stdin,
            Some(p) => flags.input = Input::File(p.clone()),
        }

        Ok(flags)
    }
}

enum CodingResult {
    Ok,
    Err(io::Error),
    Panic,
}

impl CodingResult {
    fn catch_panic(op: fn() -> Result<(), io::Error>) -> Self {
        std::panic::catch_unwind(|| match op() {
            Ok(()) => CodingResult::Ok,
            Err(err) => CodingResult::Err(err),
        })
        .unwrap_or(CodingResult::Panic)
    }
}

impl std::process::Termination for CodingResult {
    fn report(self) -> std::process::ExitCode {
        match self {
            CodingResult::Ok => std::process::ExitCode::SUCCESS,
            CodingResult::Err(err) => {
                eprintln!("{}", err);
                std::process::ExitCode::FAILURE
            }
            CodingResult::Panic => {
                eprintln!(
                    "The process failed irrecoverably! This should never happen and is a bug."
                );
                std::process::ExitCode::from(128)
            }
        }
    }
}
