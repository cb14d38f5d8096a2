use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use jot::analysis::JavaAnalyzer;
use jot::config::Config;
use jot::error::Error;
use jot::interpreter::{GreedyInterpreter, Interpreter, SimpleInterpreter};
use jot::process::ProcessBackendProvider;
use jot::watch;

#[derive(Parser)]
#[command(name = "jot", about = "Incremental Java notebooks")]
struct Cli {
    /// Evaluator command overriding the configuration, e.g.
    /// "jot-backend --classpath target/classes".
    #[arg(long, global = true)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Commands,

    /// Re-run every snippet on every change instead of interpreting
    /// incrementally.
    #[arg(long, global = true)]
    simple: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a notebook once
    Render {
        /// The .jsh notebook file
        file: PathBuf,
        /// Directory to write the page to
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render on start, then re-render on changes
    Watch {
        /// A .jsh file or a directory of notebooks
        path: PathBuf,
        /// Directory to write pages to
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    return match dispatch(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        },
    };
}

fn dispatch(cli: &Cli) -> Result<(), Error> {
    let config = Config::load(&PathBuf::from("."))?;
    let command = backend_command(cli, &config);
    let provider = ProcessBackendProvider { command };
    let mut analyzer = JavaAnalyzer::new()?;

    if cli.simple {
        let mut interpreter = SimpleInterpreter::new(provider);
        let result = run_command(cli, &config, &mut analyzer, &mut interpreter);
        interpreter.stop();
        return result;
    }
    let mut interpreter = GreedyInterpreter::new(provider);
    let result = run_command(cli, &config, &mut analyzer, &mut interpreter);
    interpreter.stop();
    return result;
}

fn run_command<I: Interpreter>(
    cli: &Cli,
    config: &Config,
    analyzer: &mut JavaAnalyzer,
    interpreter: &mut I,
) -> Result<(), Error> {
    return match &cli.command {
        Commands::Render { file, out } => {
            let out_dir = out.as_deref().or(config.out_dir.as_deref());
            let page = watch::render_file(analyzer, interpreter, file, out_dir)?;
            eprintln!("rendered {} -> {}", file.display(), page.display());
            Ok(())
        },
        Commands::Watch { path, out } => {
            let out_dir = out.as_deref().or(config.out_dir.as_deref());
            watch::run(analyzer, interpreter, path, out_dir)
        },
    };
}

/// CLI override wins over configuration.
fn backend_command(cli: &Cli, config: &Config) -> Vec<String> {
    return match &cli.backend {
        Some(raw) => raw.split_whitespace().map(String::from).collect(),
        None => config.backend_command.clone(),
    };
}
