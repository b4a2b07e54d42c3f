use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use fortuna::{ForecastEngine, ForecastReport, ForecastRequest};
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, ValueEnum)]
enum Output {
    /// Full report: events, crossings, stacking annotations and groups.
    Report,
    /// Only events that resolved to a time.
    Found,
    /// Only the stacked groups with their member entries.
    Stacks,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Forecast request JSON (chart snapshots, bodies, points, external lists).
    #[arg(long)]
    input: PathBuf,

    /// Settings file (default: configs/fortuna.toml if present, else built-in defaults).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the request epoch (RFC 3339).
    #[arg(long)]
    epoch: Option<String>,

    /// Also search backwards from the epoch.
    #[arg(long)]
    include_past: bool,

    #[arg(long, value_enum, default_value_t = Output::Report)]
    output: Output,

    /// Write JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let json = run(&args)?;
    match &args.out {
        Some(path) => std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn run(args: &Args) -> anyhow::Result<String> {
    let mut settings = fortuna_config::load_settings(args.config.as_deref())?;
    if args.include_past {
        settings.search.include_past = true;
    }

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading request {}", args.input.display()))?;
    let mut request: ForecastRequest =
        serde_json::from_str(&text).with_context(|| format!("parsing request {}", args.input.display()))?;
    if let Some(epoch) = &args.epoch {
        request.epoch = DateTime::parse_from_rfc3339(epoch)
            .with_context(|| format!("invalid --epoch {epoch}"))?
            .with_timezone(&Utc);
    }

    let engine = ForecastEngine::new(settings.search, settings.catalog)?;
    log::info!(
        "searching {} bodies against {} points from {}",
        request.transit_bodies.len(),
        request.natal_points.len(),
        request.epoch
    );
    let report = engine.run(&request);
    render(&report, &args.output, args.pretty)
}

fn render(report: &ForecastReport, output: &Output, pretty: bool) -> anyhow::Result<String> {
    let value = match output {
        Output::Report => serde_json::to_value(report)?,
        Output::Found => serde_json::to_value(report.found().collect::<Vec<_>>())?,
        Output::Stacks => serde_json::json!({
            "groups": report.groups,
            "entries": report.stacked.iter().filter(|e| e.stacked_power > 0).collect::<Vec<_>>(),
        }),
    };
    let json = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(json)
}
