//! hatch - HTML accessibility annotator

use std::io::{Read, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hatch::{Annotator, Configure, Feature, parse_html_bytes};

#[derive(Parser)]
#[command(name = "hatch")]
#[command(version, about = "Make HTML state audible to assistive technologies", long_about = None)]
#[command(after_help = "EXAMPLES:
    hatch page.html -o page.a11y.html          Annotate with every feature
    hatch page.html --only states,headings     Run selected features
    hatch - --report < page.html > out.html    Read stdin, JSON summary on stderr")]
struct Cli {
    /// Input HTML file, or - for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<String>,

    /// Configuration XML (default: built-in English texts)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<String>,

    /// Skipper definitions XML, replacing the configured skippers
    #[arg(long, value_name = "FILE")]
    skippers: Option<String>,

    /// Browser user agent, selects the shortcut modifier keys
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Comma-separated features: forms, headings, skippers, longdesc,
    /// shortcuts, images, states
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    only: Vec<Feature>,

    /// Print a JSON summary on stderr
    #[arg(long)]
    report: bool,

    /// Log per-element decisions
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "hatch=debug" } else { "hatch=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match annotate(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn annotate(cli: &Cli) -> Result<(), String> {
    let mut config = match &cli.config {
        Some(path) => Configure::from_path(path),
        None => Configure::english(),
    }
    .map_err(|e| e.to_string())?;
    if let Some(path) = &cli.skippers {
        config = config.with_skippers_path(path).map_err(|e| e.to_string())?;
    }

    let bytes = read_input(&cli.input).map_err(|e| format!("{}: {e}", cli.input))?;
    let mut annotator = Annotator::new(parse_html_bytes(&bytes), &config).map_err(|e| e.to_string())?;
    if let Some(user_agent) = &cli.user_agent {
        annotator = annotator.with_user_agent(user_agent);
    }

    let features: &[Feature] = if cli.only.is_empty() { &Feature::ALL } else { &cli.only };
    let report = annotator.run(features).map_err(|e| e.to_string())?;

    let html = annotator.to_html();
    match &cli.output {
        Some(path) => std::fs::write(path, html).map_err(|e| format!("{path}: {e}"))?,
        None => std::io::stdout()
            .write_all(html.as_bytes())
            .map_err(|e| e.to_string())?,
    }

    if cli.report {
        let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        eprintln!("{json}");
    }
    Ok(())
}

fn read_input(input: &str) -> std::io::Result<Vec<u8>> {
    if input == "-" {
        let mut bytes = Vec::new();
        std::io::stdin().read_to_end(&mut bytes)?;
        Ok(bytes)
    } else {
        std::fs::read(input)
    }
}
