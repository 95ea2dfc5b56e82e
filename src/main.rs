//! Forest plot preparation - command line entry point
//!
//! Reads already-parsed rows (JSON array of objects), runs the preparation
//! pipeline and writes the render-ready plot specification as JSON.
//!
//! Usage:
//! ```bash
//! forest_prep --input rows.json --output spec.json
//! forest_prep --input rows.json --set axis.ticks=0.5,1,2 --set plot.title="OS"
//! RUST_LOG=forest_plot_prep=debug forest_prep --input rows.json --pretty
//! ```

use anyhow::{bail, Context};
use clap::Parser;
use forest_plot_prep::config::ForestConfig;
use forest_plot_prep::forest::properties::{registry, PropertySettings};
use forest_plot_prep::forest::{ForestError, RawRow};
use forest_plot_prep::pipeline;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "forest_prep", version, about = "Prepare effect-size rows for forest plot rendering")]
struct Cli {
    /// JSON file with an array of row objects
    #[arg(short, long, required_unless_present = "list_properties")]
    input: Option<PathBuf>,

    /// Output file for the plot specification (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON object of property overrides
    #[arg(short, long, env = "FOREST_PROPERTIES")]
    properties: Option<PathBuf>,

    /// Property override, NAME=VALUE (repeatable, wins over --properties)
    #[arg(long = "set", value_parser = parse_property)]
    set: Vec<(String, String)>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// List all properties with their defaults and exit
    #[arg(long)]
    list_properties: bool,
}

fn parse_property(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    Ok((name.trim().to_string(), value.to_string()))
}

fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        match e.downcast_ref::<ForestError>() {
            Some(ForestError::Validation(report)) => {
                eprintln!("✗ Input rejected: {}", report);
            }
            _ => eprintln!("✗ {:#}", e),
        }
        std::process::exit(1);
    }
}

/// Info for both the library and this binary unless RUST_LOG says otherwise
fn log_filter() -> anyhow::Result<EnvFilter> {
    Ok(EnvFilter::from_default_env()
        .add_directive("forest_plot_prep=info".parse()?)
        .add_directive("forest_prep=info".parse()?))
}

/// Log to stderr so stdout can carry the JSON output
fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(log_filter()?)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if cli.list_properties {
        print_properties();
        return Ok(());
    }

    let Some(input) = cli.input.as_ref() else {
        bail!("--input is required");
    };

    let settings = load_settings(cli)?;
    let config = ForestConfig::from_properties(Some(&settings))?;

    tracing::info!("Reading rows from {}", input.display());
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let rows: Vec<RawRow> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse rows in {}", input.display()))?;

    let spec = pipeline::build_plot_spec(&rows, &config)?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&spec)?
    } else {
        serde_json::to_string(&spec)?
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(
                "✓ Plot specification written to {} ({} table rows)",
                path.display(),
                spec.n_rows()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Properties file first, then --set overrides
fn load_settings(cli: &Cli) -> anyhow::Result<PropertySettings> {
    let mut settings = PropertySettings::new();

    if let Some(path) = &cli.properties {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let values: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)
            .with_context(|| format!("Properties in {} must be a JSON object", path.display()))?;

        for (name, value) in values {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            settings.insert(name, value);
        }
    }

    for (name, value) in &cli.set {
        settings.insert(name.clone(), value.clone());
    }

    Ok(settings)
}

fn print_properties() {
    for def in registry().definitions() {
        let default = format!("'{}'", def.default_value);
        println!("{:<20} {:<40} {}", def.name, default, def.description);
        if let Some(values) = &def.valid_values {
            println!("{:<20} values: [{}]", "", values.join(", "));
        }
    }
}
