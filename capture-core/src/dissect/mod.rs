//! Frame dissection into named layers.
//!
//! Link, network and transport headers are decoded by `etherparse` and DNS by
//! `hickory-proto`; BOOTP/DHCP payloads are decoded here. Multicast DNS on
//! port 5353 becomes an `MDNS` layer, never a `DNS` one. Every
//! decoded value is stored as text under the field name a dissector user would
//! expect (`ip.src`, `dhcp.option_dhcp`, `dns.qry_name`, ...).

mod bootp;
mod dns;

use std::net::Ipv4Addr;
use std::time::Duration;

use chrono::DateTime;
use etherparse::{LinkSlice, NetSlice, SlicedPacket, TransportSlice};
use pcap_file::DataLink;
use thiserror::Error;

use crate::packet::{DecodedPacket, Layer};
use crate::reader::RawFrame;

pub use bootp::{BOOTP_CLIENT_PORT, BOOTP_SERVER_PORT, DHCP_MAGIC_COOKIE};
pub use dns::{DNS_PORT, MDNS_PORT};

/// Reasons a single frame could not be dissected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DissectError {
    #[error("unsupported link type {0}")]
    UnsupportedLink(String),
    #[error("malformed headers: {0}")]
    Headers(String),
    #[error("malformed {protocol} payload: {reason}")]
    Payload {
        protocol: &'static str,
        reason: String,
    },
    #[error("timestamp out of range: {0:?}")]
    Timestamp(Duration),
}

impl DissectError {
    pub(crate) fn payload(protocol: &'static str, reason: impl Into<String>) -> Self {
        Self::Payload {
            protocol,
            reason: reason.into(),
        }
    }
}

/// Decode one raw frame into its protocol layers.
pub fn dissect(frame: &RawFrame) -> Result<DecodedPacket, DissectError> {
    let timestamp = format_timestamp(frame.timestamp)?;
    let sliced = match frame.linktype {
        DataLink::ETHERNET => SlicedPacket::from_ethernet(&frame.data)
            .map_err(|err| DissectError::Headers(err.to_string()))?,
        DataLink::RAW | DataLink::IPV4 | DataLink::IPV6 => SlicedPacket::from_ip(&frame.data)
            .map_err(|err| DissectError::Headers(err.to_string()))?,
        other => return Err(DissectError::UnsupportedLink(format!("{other:?}"))),
    };

    let mut packet = DecodedPacket::new(frame.index, timestamp);

    if let Some(LinkSlice::Ethernet2(eth)) = &sliced.link {
        packet.layers.push(
            Layer::new("ETH")
                .with("src", format_mac(&eth.source()))
                .with("dst", format_mac(&eth.destination()))
                .with("type", format!("0x{:04x}", eth.ether_type().0)),
        );
    }

    match &sliced.net {
        Some(NetSlice::Ipv4(ipv4)) => {
            let header = ipv4.header();
            packet.layers.push(
                Layer::new("IP")
                    .with("version", "4")
                    .with("src", header.source_addr().to_string())
                    .with("dst", header.destination_addr().to_string())
                    .with("ttl", header.ttl().to_string())
                    .with("proto", header.protocol().0.to_string()),
            );
        }
        Some(NetSlice::Ipv6(ipv6)) => {
            let header = ipv6.header();
            packet.layers.push(
                Layer::new("IPV6")
                    .with("version", "6")
                    .with("src", header.source_addr().to_string())
                    .with("dst", header.destination_addr().to_string())
                    .with("hlim", header.hop_limit().to_string())
                    .with("nxt", header.next_header().0.to_string()),
            );
        }
        _ => {}
    }

    if let Some(TransportSlice::Udp(udp)) = &sliced.transport {
        let src_port = udp.source_port();
        let dst_port = udp.destination_port();
        packet.layers.push(
            Layer::new("UDP")
                .with("srcport", src_port.to_string())
                .with("dstport", dst_port.to_string())
                .with("length", udp.length().to_string()),
        );

        let on_port = |port: u16| src_port == port || dst_port == port;
        if on_port(BOOTP_SERVER_PORT) || on_port(BOOTP_CLIENT_PORT) {
            packet.layers.push(bootp::dissect(udp.payload())?);
        } else if on_port(MDNS_PORT) {
            packet.layers.push(dns::dissect(udp.payload(), "MDNS")?);
        } else if on_port(DNS_PORT) {
            packet.layers.push(dns::dissect(udp.payload(), "DNS")?);
        }
    }

    Ok(packet)
}

/// Render a capture timestamp as UTC `YYYY-MM-DD HH:MM:SS.ffffff`.
pub fn format_timestamp(since_epoch: Duration) -> Result<String, DissectError> {
    let secs =
        i64::try_from(since_epoch.as_secs()).map_err(|_| DissectError::Timestamp(since_epoch))?;
    let at = DateTime::from_timestamp(secs, since_epoch.subsec_nanos())
        .ok_or(DissectError::Timestamp(since_epoch))?;
    Ok(at.format("%Y-%m-%d %H:%M:%S%.6f").to_string())
}

pub(crate) fn format_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

pub(crate) fn ipv4_at(buffer: &[u8], offset: usize) -> Ipv4Addr {
    Ipv4Addr::new(
        buffer[offset],
        buffer[offset + 1],
        buffer[offset + 2],
        buffer[offset + 3],
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use etherparse::PacketBuilder;
    use pcap_file::DataLink;

    use super::{dissect, format_mac, format_timestamp, DissectError};
    use crate::reader::RawFrame;

    #[test]
    fn formats_timestamp_with_microseconds() {
        let ts = Duration::new(1_705_312_801, 250_000_000);
        assert_eq!(
            format_timestamp(ts).expect("in range"),
            "2024-01-15 10:00:01.250000"
        );
    }

    #[test]
    fn formats_mac_lowercase_colon_separated() {
        assert_eq!(
            format_mac(&[0x00, 0x1A, 0x2b, 0x3c, 0x4d, 0x5e]),
            "00:1a:2b:3c:4d:5e"
        );
    }

    #[test]
    fn rejects_unsupported_link_type() {
        let frame = RawFrame {
            index: 0,
            timestamp: Duration::ZERO,
            linktype: DataLink::LINUX_SLL,
            data: vec![0; 32],
        };
        assert!(matches!(
            dissect(&frame),
            Err(DissectError::UnsupportedLink(_))
        ));
    }

    #[test]
    fn truncated_ethernet_frame_is_a_header_error() {
        let frame = RawFrame {
            index: 0,
            timestamp: Duration::ZERO,
            linktype: DataLink::ETHERNET,
            data: vec![0xff; 6],
        };
        assert!(matches!(dissect(&frame), Err(DissectError::Headers(_))));
    }

    #[test]
    fn multicast_dns_is_not_a_dns_layer() {
        let mut payload = vec![0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0];
        payload.extend_from_slice(b"\x07printer\x05local\x00");
        payload.extend_from_slice(&[0, 12, 0, 1]);
        let builder = PacketBuilder::ethernet2([0x02; 6], [0x01, 0x00, 0x5e, 0, 0, 0xfb])
            .ipv4([192, 168, 0, 20], [224, 0, 0, 251], 255)
            .udp(5353, 5353);
        let mut data = Vec::new();
        builder.write(&mut data, &payload).expect("serialize");

        let frame = RawFrame {
            index: 0,
            timestamp: Duration::ZERO,
            linktype: DataLink::ETHERNET,
            data,
        };
        let packet = dissect(&frame).expect("dissect");
        assert_eq!(packet.protocols(), "ETH:IP:UDP:MDNS");
        assert!(packet.layer("DNS").is_none());
        assert_eq!(
            packet.layer("MDNS").and_then(|layer| layer.get("qry_name")),
            Some("printer.local")
        );
    }
}
