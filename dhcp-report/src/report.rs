use capture_core::CaptureFormat;
use colored::Colorize;
use serde::Serialize;

use crate::event::DhcpEvent;
use crate::pipeline::RunContext;
use crate::stats::TypeCount;
use crate::styles::Styles;

/// Width of the horizontal rules between report sections.
pub const RULE_WIDTH: usize = 80;

/// DNS queries listed before the remainder is collapsed into a count.
pub const DEFAULT_DNS_PREVIEW: usize = 10;

const FIELD_WIDTH: usize = 15;
const TIME_WIDTH: usize = 19;
const MAC_WIDTH: usize = 17;

/// Headline counts for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_processed: usize,
    pub dhcp_events: usize,
    pub dns_queries: usize,
    pub unique_ips: usize,
    pub skipped_packets: usize,
    pub frames: usize,
}

impl Summary {
    pub fn from_context(context: &RunContext) -> Self {
        Self {
            total_processed: context.total_processed(),
            dhcp_events: context.events.len(),
            dns_queries: context.dns_queries.len(),
            unique_ips: context.addresses.len(),
            skipped_packets: context.skipped,
            frames: context.frames,
        }
    }
}

/// Machine-readable form of the whole report.
#[derive(Debug, Serialize)]
pub struct CaptureReport<'a> {
    pub capture: String,
    pub format: Option<CaptureFormat>,
    pub summary: Summary,
    pub dns_queries: &'a [String],
    /// Events sorted by time.
    pub events: &'a [DhcpEvent],
    /// Most common first.
    pub type_counts: Vec<TypeCount>,
    pub csv: Option<String>,
}

fn rule(ch: char) -> String {
    ch.to_string().repeat(RULE_WIDTH)
}

fn heading(out: &mut Vec<String>, title: &str) {
    out.push(String::new());
    out.push(rule('─'));
    out.push(title.bold().to_string());
    out.push(rule('─'));
}

/// Render the banner and headline counts.
pub fn render_summary(summary: &Summary) -> String {
    let mut out = vec![
        String::new(),
        rule('═'),
        "DHCP CAPTURE ANALYSIS".bold().to_string(),
        rule('═'),
    ];
    out.push(format!("Packets processed: {}", summary.total_processed));
    out.push(format!("DHCP events found: {}", summary.dhcp_events));
    out.push(format!("DNS queries: {}", summary.dns_queries));
    out.push(format!("Unique IP addresses: {}", summary.unique_ips));
    out.join("\n")
}

/// Render the first `limit` DNS queries and a count of the rest.
pub fn render_dns_queries(queries: &[String], limit: usize) -> String {
    if queries.is_empty() {
        return "\nDNS queries: none (normal for a DHCP-only capture)".to_string();
    }

    let mut out = vec![String::new(), "DNS queries:".cyan().to_string()];
    for query in queries.iter().take(limit) {
        out.push(format!("  • {query}"));
    }
    if queries.len() > limit {
        out.push(format!("  ... and {} more", queries.len() - limit));
    }
    out.join("\n")
}

/// One table line, without color.
pub fn render_event_line(event: &DhcpEvent) -> String {
    format!(
        "{} | {} → {:<w$} | {} → {} | Client IP: {:<w$.w$} | Your IP: {:<w$.w$} | Requested: {:<w$.w$} | MAC: {}",
        truncate(&event.time, TIME_WIDTH),
        event.bootp_op,
        event.dhcp_type,
        event.src,
        event.dst,
        event.ciaddr,
        event.yiaddr,
        event.requested_ip,
        truncate(&event.chaddr, MAC_WIDTH),
        w = FIELD_WIDTH,
    )
}

/// Render the event table; `events` are printed in the order given.
pub fn render_event_table(events: &[DhcpEvent], styles: &Styles) -> String {
    let mut out = Vec::new();
    heading(&mut out, &format!("All DHCP events ({})", events.len()));
    for event in events {
        let line = render_event_line(event);
        let line = match styles.color_for(&event.dhcp_type) {
            Some(color) => line.color(color).to_string(),
            None => line.normal().to_string(),
        };
        out.push(line);
    }
    out.join("\n")
}

/// Render per-type counts in the order given.
pub fn render_type_counts(counts: &[TypeCount]) -> String {
    let mut out = Vec::new();
    heading(&mut out, "Message type distribution");
    for entry in counts {
        out.push(format!("  {:<20} : {:>3}", entry.label, entry.count));
    }
    out.join("\n")
}

/// Shown instead of the table when the capture had no DHCP/BOOTP packets.
pub fn render_no_events_hint() -> String {
    [
        String::new(),
        "No DHCP events found. Possible reasons:".yellow().to_string(),
        "• the capture contains no BOOTP/DHCP packets".to_string(),
        "• the decoder did not recognise the BOOTP/DHCP layer".to_string(),
        "Tip: open the capture in Wireshark and apply the display filter 'bootp' or 'dhcp'"
            .to_string(),
    ]
    .join("\n")
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}
