//! CLI entry point for the M16C disassembler binary.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use m16c_arch::{DisplayConfig, M16cArchitecture};
use m16c_dis::{parse_address, render_listing, ListingOptions};
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: m16c-dis <input> [options]

Options:
  -b, --base <addr>  Load address of the first byte (default: 0)
      --no-suffix    Hide the :G/:Q/:S/:Z format suffix
      --il           Print lifted IL under each instruction
  -h, --help         Show this help message

Environment:
  RUST_LOG=error     Report decode/encode roundtrip mismatches

Examples:
  m16c-dis firmware.bin --base 0xF0000
  m16c-dis firmware.bin --no-suffix --il
";

#[derive(Debug, PartialEq, Eq)]
struct DisArgs {
    input: PathBuf,
    base: u32,
    show_suffix: bool,
    il: bool,
}

#[derive(Debug)]
enum ParseResult {
    Disassemble(DisArgs),
    Help,
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut input: Option<PathBuf> = None;
    let mut base = 0;
    let mut show_suffix = true;
    let mut il = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "--no-suffix" {
            show_suffix = false;
            continue;
        }

        if arg == "--il" {
            il = true;
            continue;
        }

        if arg == "-b" || arg == "--base" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --base".to_string())?;
            base = parse_address(&value.to_string_lossy())?;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(ParseResult::Disassemble(DisArgs {
        input,
        base,
        show_suffix,
        il,
    }))
}

fn run(args: &DisArgs) -> Result<(), i32> {
    let image = match fs::read(&args.input) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("error: failed to read {}: {e}", args.input.display());
            return Err(1);
        }
    };
    log::info!(
        "disassembling {} ({} bytes) at {:#07x}",
        args.input.display(),
        image.len(),
        args.base
    );

    let options = ListingOptions {
        base: args.base,
        display: DisplayConfig::default().with_suffix(args.show_suffix),
        il: args.il,
    };
    print!("{}", render_listing(&M16cArchitecture::new(), &image, &options));
    Ok(())
}

fn main() {
    env_logger::init();

    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Disassemble(args)) => match run(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}
