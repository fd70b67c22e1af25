//! CLI entry point for the headless cartridge runner.

mod logger;
mod report;

use std::cell::Cell;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;

use snes_core::{
    strip_copier_header, CartridgeHeader, Machine, MachineConfig, MappingScheme, RunOutcome,
};
#[cfg(test)]
use tempfile as _;
use thiserror::Error;

use crate::report::{header_line, registers_line, trace_line, Tally, TallySink};

const USAGE_TEXT: &str = "\
Usage: snes-run <rom> [options]

Options:
  --frames <n>  Frames to run before reporting (default: 1)
  --trace       Print each executed instruction
  --lorom       Force LoROM mapping
  --hirom       Force HiROM mapping
  --no-nmi      Do not raise NMI at the end of each frame
  -v, --verbose Log load and mapping details to stderr
  -h, --help    Show this help message

Examples:
  snes-run game.sfc
  snes-run game.smc --frames 60 --hirom
  snes-run test.sfc --trace --no-nmi
";

/// Rows shown in the closing disassembly window.
const WINDOW_ROWS: usize = 8;

#[derive(Debug, Error)]
enum RunError {
    #[error("{0}")]
    Usage(String),
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("{} holds no cartridge data", path.display())]
    EmptyImage { path: PathBuf },
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl RunError {
    const fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            Self::Read { .. } | Self::EmptyImage { .. } | Self::Output(_) => 1,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    rom: PathBuf,
    frames: u32,
    trace: bool,
    scheme: Option<MappingScheme>,
    deliver_nmi: bool,
    verbose: bool,
}

#[derive(Debug)]
enum ParseResult {
    Run(RunArgs),
    Help,
}

fn usage_error(message: impl Into<String>) -> RunError {
    RunError::Usage(message.into())
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, RunError> {
    let mut rom: Option<PathBuf> = None;
    let mut frames = 1;
    let mut trace = false;
    let mut scheme = None;
    let mut deliver_nmi = true;
    let mut verbose = false;

    while let Some(arg) = args.next() {
        let text = arg.to_string_lossy();
        match text.as_ref() {
            "-h" | "--help" => return Ok(ParseResult::Help),
            "--trace" => trace = true,
            "--no-nmi" => deliver_nmi = false,
            "-v" | "--verbose" => verbose = true,
            "--lorom" | "--hirom" => {
                let forced = if text == "--lorom" {
                    MappingScheme::LoRom
                } else {
                    MappingScheme::HiRom
                };
                if scheme.is_some_and(|earlier| earlier != forced) {
                    return Err(usage_error("--lorom and --hirom are mutually exclusive"));
                }
                scheme = Some(forced);
            }
            "--frames" => {
                let value = args
                    .next()
                    .ok_or_else(|| usage_error("missing value for --frames"))?;
                let value = value.to_string_lossy();
                frames = value
                    .parse()
                    .map_err(|_| usage_error(format!("invalid frame count: {value}")))?;
            }
            option if option.starts_with('-') => {
                return Err(usage_error(format!("unknown option: {option}")));
            }
            _ => {
                if rom.is_some() {
                    return Err(usage_error("multiple cartridge paths provided"));
                }
                rom = Some(PathBuf::from(&arg));
            }
        }
    }

    let rom = rom.ok_or_else(|| usage_error("missing cartridge path"))?;
    Ok(ParseResult::Run(RunArgs {
        rom,
        frames,
        trace,
        scheme,
        deliver_nmi,
        verbose,
    }))
}

fn load_machine(args: &RunArgs) -> Result<Machine, RunError> {
    let image = fs::read(&args.rom).map_err(|source| RunError::Read {
        path: args.rom.clone(),
        source,
    })?;
    let cartridge = strip_copier_header(&image);
    if cartridge.len() != image.len() {
        log::debug!("dropped {} byte copier header", image.len() - cartridge.len());
    }
    if cartridge.is_empty() {
        return Err(RunError::EmptyImage {
            path: args.rom.clone(),
        });
    }

    let mut machine = Machine::new(MachineConfig {
        tracing_enabled: true,
        scheme_override: args.scheme,
        ..MachineConfig::default()
    });
    machine.load_cartridge(cartridge);
    machine.reset();
    log::info!(
        "loaded {} as {:?}, entry {:06X}",
        args.rom.display(),
        machine.bus().scheme(),
        machine.cpu().registers().program_address()
    );
    Ok(machine)
}

/// Same budget as [`Machine::run_frame`], printing one line per step.
fn run_traced_frame(
    machine: &mut Machine,
    deliver_nmi: bool,
    out: &mut impl Write,
) -> Result<RunOutcome, RunError> {
    let budget = machine.config().cycles_per_frame;
    let mut outcome = RunOutcome::default();
    while outcome.cycles < budget {
        let cpu = machine.cpu();
        let fetches = cpu.run_state().is_running() || cpu.nmi_pending() || cpu.irq_pending();
        let row = if fetches {
            machine.disassemble_at_pc(1).pop()
        } else {
            None
        };
        let step = machine.step_detailed();
        outcome.cycles += u64::from(step.cycles());
        outcome.steps = outcome.steps.saturating_add(1);
        if let Some(line) = trace_line(row.as_ref(), step) {
            writeln!(out, "{line}")?;
        }
    }
    if deliver_nmi {
        machine.cpu_mut().raise_nmi();
    }
    Ok(outcome)
}

fn run(args: &RunArgs, out: &mut impl Write) -> Result<(), RunError> {
    let mut machine = load_machine(args)?;
    let tally = Rc::new(Cell::new(Tally::default()));
    machine.set_trace_sink(Box::new(TallySink(Rc::clone(&tally))));

    let header = CartridgeHeader::parse(machine.bus().rom(), machine.bus().scheme());
    writeln!(out, "{}", header_line(header.as_ref(), machine.bus().scheme()))?;

    let mut total = RunOutcome::default();
    for _ in 0..args.frames {
        let frame = if args.trace {
            run_traced_frame(&mut machine, args.deliver_nmi, out)?
        } else {
            machine.run_frame(args.deliver_nmi)
        };
        total.steps = total.steps.saturating_add(frame.steps);
        total.cycles += frame.cycles;
    }

    let tally = tally.get();
    writeln!(
        out,
        "frames={} steps={} cycles={} instructions={} interrupts={}",
        args.frames, total.steps, total.cycles, tally.instructions, tally.interrupts
    )?;
    writeln!(out, "{}", registers_line(machine.cpu()))?;
    for row in machine.disassemble_at_pc(WINDOW_ROWS) {
        writeln!(out, "{row}")?;
    }
    Ok(())
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(args)) => {
            logger::init(logger::level_for(args.verbose));
            let stdout = io::stdout();
            let mut out = io::BufWriter::new(stdout.lock());
            match run(&args, &mut out).and_then(|()| out.flush().map_err(RunError::from)) {
                Ok(()) => 0,
                Err(error) => {
                    eprintln!("error: {error}");
                    error.exit_code()
                }
            }
        }
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            error.exit_code()
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ParseResult, RunError> {
        parse_args(args.iter().map(OsString::from))
    }

    fn parsed_run(args: &[&str]) -> RunArgs {
        match parse(args).expect("arguments should parse") {
            ParseResult::Run(args) => args,
            ParseResult::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn defaults_to_one_frame_with_nmi() {
        assert_eq!(
            parsed_run(&["game.sfc"]),
            RunArgs {
                rom: PathBuf::from("game.sfc"),
                frames: 1,
                trace: false,
                scheme: None,
                deliver_nmi: true,
                verbose: false,
            }
        );
    }

    #[test]
    fn parses_every_option() {
        let args = parsed_run(&[
            "--frames", "60", "game.smc", "--trace", "--hirom", "--no-nmi", "-v",
        ]);
        assert_eq!(args.frames, 60);
        assert!(args.verbose);
        assert!(args.trace);
        assert_eq!(args.scheme, Some(MappingScheme::HiRom));
        assert!(!args.deliver_nmi);
    }

    #[test]
    fn repeated_scheme_flag_is_accepted() {
        let args = parsed_run(&["--lorom", "game.sfc", "--lorom"]);
        assert_eq!(args.scheme, Some(MappingScheme::LoRom));
    }

    #[test]
    fn parses_help_flag() {
        assert!(matches!(parse(&["-h"]), Ok(ParseResult::Help)));
    }

    #[test]
    fn rejects_conflicting_schemes() {
        let error = parse(&["game.sfc", "--lorom", "--hirom"]).unwrap_err();
        assert!(error.to_string().contains("mutually exclusive"));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn rejects_bad_frame_counts() {
        let error = parse(&["game.sfc", "--frames", "many"]).unwrap_err();
        assert_eq!(error.to_string(), "invalid frame count: many");
        let error = parse(&["game.sfc", "--frames"]).unwrap_err();
        assert!(error.to_string().contains("missing value"));
    }

    #[test]
    fn rejects_unknown_options_and_extra_paths() {
        let error = parse(&["--fast", "game.sfc"]).unwrap_err();
        assert!(error.to_string().contains("unknown option: --fast"));
        let error = parse(&["a.sfc", "b.sfc"]).unwrap_err();
        assert!(error.to_string().contains("multiple cartridge paths"));
    }

    #[test]
    fn requires_a_cartridge_path() {
        let error = parse(&["--trace"]).unwrap_err();
        assert!(error.to_string().contains("missing cartridge path"));
    }

    #[test]
    fn read_failures_map_to_exit_code_one() {
        let error = RunError::Read {
            path: PathBuf::from("missing.sfc"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(error.exit_code(), 1);
        assert_eq!(error.to_string(), "failed to read missing.sfc: not found");
    }
}
