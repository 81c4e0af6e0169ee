use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use dhcp_report::chart::{render_terminal, BarChart};
use dhcp_report::event::DhcpEvent;
use dhcp_report::export::{write_chart_svg, write_events_csv};
use dhcp_report::pipeline::{analyze_capture, RunContext};
use dhcp_report::report::{
    render_dns_queries, render_event_table, render_no_events_hint, render_summary,
    render_type_counts, CaptureReport, Summary,
};
use dhcp_report::stats::{count_by_type, most_common, sort_by_time, TypeCount};
use dhcp_report::styles::{default_styles, load_styles, Styles};
use tracing::{info, warn};

mod cli;
mod logging;
mod path_guard;

use cli::{Cli, OutputFormat};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let styles = resolve_styles(cli.styles_file.as_deref());
    let text = cli.format == OutputFormat::Text;

    if text {
        println!("Analyzing capture: {}", cli.capture.display());
        println!("Processing packets...");
    }
    let context = analyze_capture(&cli.capture)?;

    let mut sorted = context.events.clone();
    sort_by_time(&mut sorted);
    // Counted over capture order so ties keep first-seen order.
    let counts = count_by_type(&context.events);

    let has_events = !sorted.is_empty();
    match cli.format {
        OutputFormat::Text => print_text(&cli, &context, &sorted, &counts, &styles),
        OutputFormat::Json => print_json(&cli, &context, &sorted, &counts, has_events)?,
    }

    // Console report first, output files after it.
    if has_events {
        write_outputs(&cli, &sorted, &counts, &styles)?;
        if text {
            println!();
            println!("All events saved to {}", cli.csv.display());
            if let Some(svg_path) = &cli.chart_svg {
                println!("Chart saved to {}", svg_path.display());
            }
        }
    }
    Ok(())
}

fn resolve_styles(path: Option<&Path>) -> Styles {
    let Some(path) = path else {
        return default_styles();
    };

    match load_styles(path) {
        Ok(styles) => styles,
        Err(err) => {
            warn!(
                path = %path.display(),
                "failed to load styles ({err}); using embedded defaults"
            );
            default_styles()
        }
    }
}

/// CSV and the optional SVG chart; only called when there are events.
fn write_outputs(
    cli: &Cli,
    sorted: &[DhcpEvent],
    counts: &[TypeCount],
    styles: &Styles,
) -> Result<()> {
    path_guard::ensure_not_capture(&cli.csv, &cli.capture)?;
    write_events_csv(&cli.csv, sorted)
        .with_context(|| format!("failed to export events to {}", cli.csv.display()))?;
    info!(path = %cli.csv.display(), rows = sorted.len(), "events CSV written");

    if let Some(svg_path) = &cli.chart_svg {
        path_guard::ensure_not_capture(svg_path, &cli.capture)?;
        let chart = BarChart::from_counts(counts, styles);
        write_chart_svg(svg_path, &chart)
            .with_context(|| format!("failed to export chart to {}", svg_path.display()))?;
        info!(path = %svg_path.display(), bars = chart.bars.len(), "chart SVG written");
    }
    Ok(())
}

fn print_text(
    cli: &Cli,
    context: &RunContext,
    sorted: &[DhcpEvent],
    counts: &[TypeCount],
    styles: &Styles,
) {
    println!("{}", render_summary(&Summary::from_context(context)));
    println!("{}", render_dns_queries(&context.dns_queries, cli.dns_limit));

    if sorted.is_empty() {
        println!("{}", render_no_events_hint());
        return;
    }

    println!("{}", render_event_table(sorted, styles));
    println!("{}", render_type_counts(&most_common(counts)));

    if !cli.no_chart {
        let chart = BarChart::from_counts(counts, styles);
        println!("{}", render_terminal(&chart, cli.chart_height));
    }
}

fn print_json(
    cli: &Cli,
    context: &RunContext,
    sorted: &[DhcpEvent],
    counts: &[TypeCount],
    has_events: bool,
) -> Result<()> {
    let report = CaptureReport {
        capture: cli.capture.display().to_string(),
        format: context.format,
        summary: Summary::from_context(context),
        dns_queries: &context.dns_queries,
        events: sorted,
        type_counts: most_common(counts),
        csv: has_events.then(|| cli.csv.display().to_string()),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to serialize report")?
    );
    Ok(())
}
