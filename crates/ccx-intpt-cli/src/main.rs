use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use ccx_intpt::{IntPtError, Processed, postprocess};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Mises stress, effective strain and PEEQ at the integration points of a
/// CalculiX `.dat` file.
///
/// Element output must be requested in the input deck with
/// `*EL PRINT, ELSET=Eall` / `S, E, PEEQ`.
#[derive(Parser, Debug)]
#[command(name = "ccx-intpt", version, about)]
struct Cli {
    /// Path to the .dat file; prompted for when omitted.
    input: Option<PathBuf>,

    /// Write the report here instead of `<job>_IntPtOutput.txt`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also print statistics and warnings as JSON on stdout.
    #[arg(long)]
    json: bool,
}

fn prompt_for_input(status: &mut dyn Write) -> anyhow::Result<PathBuf> {
    writeln!(status, "\nPlease enter path and name of .dat file:")?;
    status.flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read input path")?;
    Ok(PathBuf::from(line.trim_end_matches(['\r', '\n'])))
}

fn summary_json(output: &Path, processed: &Processed) -> serde_json::Value {
    serde_json::json!({
        "report": output.display().to_string(),
        "rows": processed.results.len(),
        "statistics": processed.statistics,
        "warnings": processed.warnings,
    })
}

/// `out` receives the JSON summary only; prompts and progress go to `status`.
fn run(cli: Cli, out: &mut dyn Write, status: &mut dyn Write) -> anyhow::Result<()> {
    let input = match cli.input {
        Some(path) => path,
        None => prompt_for_input(status)?,
    };

    let (output, processed) = postprocess(&input, cli.output.as_deref())?;

    for warning in &processed.warnings {
        eprintln!("\n{warning}");
    }
    writeln!(
        status,
        "\nResults successfully written to file '{}'.\n",
        output.display()
    )?;

    if cli.json {
        let summary = summary_json(&output, &processed);
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut out = io::stdout();
    let mut status: Box<dyn Write> = if cli.json {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };
    match run(cli, &mut out, status.as_mut()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("\n{err:#}\n");
            let code = match err.downcast_ref::<IntPtError>() {
                Some(IntPtError::InvalidInputPath { .. }) => 2,
                Some(IntPtError::MissingRequiredBlock { .. }) => 3,
                Some(IntPtError::MalformedRow { .. } | IntPtError::RowCountMismatch { .. }) => 4,
                _ => 1,
            };
            ExitCode::from(code)
        }
    }
}
