use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use dhcp_report::chart::DEFAULT_HEIGHT;
use dhcp_report::report::DEFAULT_DNS_PREVIEW;

#[derive(Parser, Debug)]
#[command(name = "dhcp-report")]
#[command(about = "Summarize DHCP/BOOTP and DNS activity in a packet capture")]
pub struct Cli {
    /// Capture file to analyze (pcap or pcapng).
    #[arg(default_value = "dhcp.pcapng")]
    pub capture: PathBuf,
    /// Where to write the DHCP events CSV (overwritten).
    #[arg(long, default_value = "dhcp_all_events.csv")]
    pub csv: PathBuf,
    /// Output format for the console report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Do not draw the message-type chart in the terminal.
    #[arg(long)]
    pub no_chart: bool,
    /// Also write the message-type chart as an SVG file.
    #[arg(long)]
    pub chart_svg: Option<PathBuf>,
    /// Rows used for the tallest bar of the terminal chart.
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub chart_height: usize,
    /// Number of DNS queries listed before the rest are summarized.
    #[arg(long, default_value_t = DEFAULT_DNS_PREVIEW)]
    pub dns_limit: usize,
    /// Optional styles TOML file (terminal colors per type, chart palette).
    #[arg(long)]
    pub styles_file: Option<PathBuf>,
    /// Disable ANSI colors.
    #[arg(long)]
    pub no_color: bool,
    /// Log per-packet decisions to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
