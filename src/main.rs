extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate snafu;
extern crate term_grid;

pub mod compiler;

use clap::{App, AppSettings, Arg, ErrorKind};
use snafu::ResultExt;
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use compiler::asm::Instruction;
use compiler::error::{CompileError, CompileResult, OutputSnafu, WriteSnafu};

#[derive(Debug, PartialEq)]
struct Options {
    input: String,
    output: Option<PathBuf>,
    verbosity: u64,
    print_debug: bool,
}

fn main() {
    let options = match process_arguments(std::env::args_os()) {
        Ok(options) => options,
        Err(err) => {
            initialize_logging(0);
            error!("{}", err);
            std::process::exit(1);
        }
    };
    initialize_logging(options.verbosity);

    debug!("Arguments:\n\tVerbosity: {}\n\tPrint Debug: {}\n\tOutfile: {}\n\tExpression: {}",
        level_for(options.verbosity),
        options.print_debug,
        options.output.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "None".to_owned()),
        options.input
    );

    if let Err(err) = run(&options) {
        if let Some(offset) = err.offset() {
            debug!("Compilation stopped at byte {} of the expression.", offset);
        }
        error!("{}", err);
        std::process::exit(1);
    }
}

/// Compile into memory first so a failed run never leaves partial assembly
/// on stdout or in the output file.
fn run(options: &Options) -> CompileResult<()> {
    let mut asm: Vec<u8> = Vec::with_capacity(128);
    let listing = compiler::compile(&options.input, &mut asm)?;

    match &options.output {
        Some(path) => {
            File::create(path)
                .and_then(|mut file| file.write_all(&asm))
                .context(OutputSnafu { path: path.clone() })?;
            info!("Wrote {} byte(s) of assembly to `{}`.", asm.len(), path.display());
        },
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(&asm).and_then(|_| handle.flush()).context(WriteSnafu)?;
        },
    }

    info!("Expression evaluates to {}.", compiler::asm::evaluate(&listing));
    if options.print_debug {
        eprint!("{}", debug_listing(&listing));
    }

    Ok(())
}

/// One row per emitted line: index, instruction, and the accumulator after it.
fn debug_listing(listing: &[Instruction]) -> String {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    let mut acc = 0;
    for (idx, ins) in listing.iter().enumerate() {
        acc = ins.apply(acc);
        grid.add(Cell::from(format!("{:>3}:", idx)));
        grid.add(Cell::from(ins.to_string().trim_start().to_owned()));
        grid.add(Cell::from("=>".to_string()));
        grid.add(Cell::from(format!("rax = {}", acc)));
    }

    grid.fit_into_columns(4).to_string()
}

fn process_arguments<I, T>(args: I) -> CompileResult<Options>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    // A lone argument is always the expression, even one that looks like a flag.
    if args.len() == 2 {
        let input = args[1].clone().into_string()
            .map_err(|_| CompileError::Usage { message: "the expression is not valid UTF-8".to_owned() })?;
        return Ok(Options { input, output: None, verbosity: 0, print_debug: false });
    }

    let matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .setting(AppSettings::StrictUtf8)
        .setting(AppSettings::AllowLeadingHyphen)
        .arg(Arg::with_name("EXPR")
            .help("The expression to compile, e.g. \"5+20-4\"")
            .required(true)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("output")
            .short("o")
            .takes_value(true)
            .help("write assembly to an outfile instead of STDOUT"))
        .arg(Arg::with_name("print-debug")
            .short("d")
            .takes_value(false)
            .help("prints the emitted instructions and the running value of rax to STDERR"))
        .get_matches_from_safe(args)
        .map_err(|err| match err.kind {
            ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => err.exit(),
            _ => CompileError::Usage { message: err.message },
        })?;

    let input = matches.value_of("EXPR")
        .ok_or_else(|| CompileError::Usage { message: "missing expression".to_owned() })?;

    Ok(Options {
        input: input.to_owned(),
        output: matches.value_of("output").map(PathBuf::from),
        verbosity: matches.occurrences_of("verbose"),
        print_debug: matches.is_present("print-debug"),
    })
}

fn level_for(verbosity: u64) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    }
}

// STDOUT carries the assembly, so everything else goes to STDERR.
fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level_for(verbosity))
        .chain(std::io::stderr())
        .apply().ok();
}
