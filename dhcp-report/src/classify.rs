//! Per-packet classification.
//!
//! A packet can contribute to three collections at once: its IP endpoints,
//! its DNS query name, and a DHCP event. [`classify`] works out all three
//! without touching any shared state, so a failure part-way through leaves
//! nothing half-recorded.

use capture_core::{DissectError, LayeredPacket};
use thiserror::Error;

use crate::event::{bootp_op_label, dhcp_type_label, DhcpEvent};

/// Why a packet was left out of the report.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("frame could not be decoded: {0}")]
    Decode(#[from] DissectError),
    #[error("IP layer has no {0} address")]
    MissingIpField(&'static str),
}

/// Everything one packet contributes to a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Source and destination IPv4 addresses.
    pub endpoints: Option<(String, String)>,
    pub dns_query: Option<String>,
    pub event: Option<DhcpEvent>,
}

/// Inspect one packet.
pub fn classify<P: LayeredPacket + ?Sized>(packet: &P) -> Result<Classification, ExtractionError> {
    let endpoints = if packet.has_layer("IP") {
        let src = packet
            .field("IP", "src")
            .ok_or(ExtractionError::MissingIpField("src"))?;
        let dst = packet
            .field("IP", "dst")
            .ok_or(ExtractionError::MissingIpField("dst"))?;
        Some((src.to_string(), dst.to_string()))
    } else {
        None
    };

    let dns_query = if packet.has_layer("DNS") {
        packet.field("DNS", "qry_name").map(str::to_string)
    } else {
        None
    };

    let event = dhcp_layer(packet).map(|layer| build_event(packet, layer, endpoints.as_ref()));

    Ok(Classification {
        endpoints,
        dns_query,
        event,
    })
}

/// `DHCP` wins over `BOOTP` when a packet somehow carries both.
fn dhcp_layer<P: LayeredPacket + ?Sized>(packet: &P) -> Option<&'static str> {
    ["DHCP", "BOOTP"]
        .into_iter()
        .find(|name| packet.has_layer(name))
}

fn build_event<P: LayeredPacket + ?Sized>(
    packet: &P,
    layer: &str,
    endpoints: Option<&(String, String)>,
) -> DhcpEvent {
    let text = |field: &str| packet.field(layer, field).unwrap_or_default().to_string();
    let (src, dst) = match endpoints {
        Some((src, dst)) => (src.clone(), dst.clone()),
        None => ("unknown".to_string(), "unknown".to_string()),
    };

    DhcpEvent {
        time: packet.sniff_timestamp().to_string(),
        src,
        dst,
        bootp_op: bootp_op_label(packet.field(layer, "op")).to_string(),
        dhcp_type: dhcp_type_label(packet.field(layer, "option_dhcp")),
        ciaddr: text("ciaddr"),
        yiaddr: text("yiaddr"),
        siaddr: text("siaddr"),
        giaddr: text("giaddr"),
        chaddr: text("chaddr"),
        requested_ip: text("option_requested_ip_address"),
    }
}
