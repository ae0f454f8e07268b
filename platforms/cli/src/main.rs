use clap::Parser;
use std::path::PathBuf;
use std::process;
use tmsim::{
    Alphabet, Outcome, ProgramManager, Simulation, SimulationConfig, TuringMachineError,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// The machine description file to execute
    machine: Option<PathBuf>,

    /// The tape alphabet; the first symbol is the blank
    #[clap(short, long)]
    alphabet: Option<String>,

    /// The initial tape contents, written from offset 0
    #[clap(short, long)]
    input: Option<String>,

    /// Stop after this many steps
    #[clap(short, long)]
    steps: Option<usize>,

    /// Do not print the per-step trace
    #[clap(short, long)]
    quiet: bool,

    /// Write the trace to this file instead of stdout
    #[clap(short = 'f', long)]
    output: Option<PathBuf>,

    /// Load settings from a JSON file; other flags override it
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Run one of the embedded sample machines
    #[clap(long, conflicts_with = "machine")]
    builtin: Option<String>,

    /// List the embedded sample machines
    #[clap(long)]
    list: bool,

    /// Enable debug logging on stderr
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(Some(outcome)) => println!("{}", outcome),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<Option<Outcome>, TuringMachineError> {
    if cli.list {
        for program in ProgramManager::programs() {
            println!("{:<20} [{}] {}", program.name, program.alphabet, program.description());
        }
        return Ok(None);
    }

    let mut config = match &cli.config {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            SimulationConfig::from_json_file(path)?
        }
        None => SimulationConfig::default(),
    };

    if let Some(machine) = cli.machine {
        config.source = machine;
    }
    if let Some(input) = cli.input {
        config.input = input;
    }
    if cli.steps.is_some() {
        config.step_limit = cli.steps;
    }
    if cli.output.is_some() {
        config.trace_output = cli.output;
    }
    config.quiet |= cli.quiet;

    let mut simulation = match cli.builtin {
        Some(name) => {
            let program = ProgramManager::get_program_by_name(&name)?;
            debug!(name = program.name, alphabet = program.alphabet, "running builtin");
            config.alphabet = match &cli.alphabet {
                Some(symbols) => Alphabet::parse(symbols)?,
                None => program.alphabet()?,
            };
            Simulation::from_source(config, program.source)?
        }
        None => {
            if let Some(symbols) = &cli.alphabet {
                config.alphabet = Alphabet::parse(symbols)?;
            }
            Simulation::from_config(config)?
        }
    };

    simulation.run().map(Some)
}
