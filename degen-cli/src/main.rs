use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use degen_ast::File;
use degen_diagnostics::{DiagnosticEngine, EngineError};
use degen_engine::driver::{run_to_fixpoint, Frontend};
use degen_engine::TypeCheckFacade;
use degen_parser::Parser as DegenParser;

mod infer;

/// Rewrites a source file's generic declarations and call sites down to
/// monomorphic ones, reparsing and rechecking between passes until a
/// fixpoint is reached (or `--maxstage` passes have run).
#[derive(ClapParser)]
#[command(name = "degen")]
#[command(version = "0.1.0")]
#[command(about = "Degeneration pass: monomorphize generic declarations", long_about = None)]
struct Cli {
    /// Source file to run the degeneration pass over
    input: PathBuf,

    /// Where to write the degenerated source
    #[arg(short, long, default_value = "out.degen")]
    out: PathBuf,

    /// Print each pass's intermediate source to stderr
    #[arg(long)]
    debug: bool,

    /// Cap the number of degeneration passes; negative runs to a fixpoint
    #[arg(long, default_value_t = -1)]
    maxstage: i64,
}

struct CliFrontend {
    debug: bool,
}

impl Frontend for CliFrontend {
    fn parse(&self, source: &str) -> std::result::Result<File, EngineError> {
        DegenParser::new(source)
            .and_then(|mut p| p.parse_file())
            .map_err(|e| EngineError::Source(e.to_string()))
    }

    fn check(&self, file: &File) -> std::result::Result<Box<dyn TypeCheckFacade>, EngineError> {
        Ok(Box::new(infer::build_checker(file)))
    }

    fn print(&self, file: &File) -> String {
        let out = degen_printer::print_file(file);
        if self.debug {
            eprintln!("--- pass output ---\n{out}");
        }
        out
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    let frontend = CliFrontend { debug: cli.debug };
    let mut diagnostics = DiagnosticEngine::new();

    let result = run_to_fixpoint(&frontend, &source, cli.maxstage, &mut diagnostics)
        .map_err(|e| anyhow::anyhow!("degeneration failed: {e}"))?;

    fs::write(&cli.out, result).with_context(|| format!("writing {}", cli.out.display()))?;

    diagnostics.print_all();

    Ok(())
}
