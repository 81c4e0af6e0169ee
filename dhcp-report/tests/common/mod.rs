#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use etherparse::PacketBuilder;
use pcap_file::pcap::{PcapPacket, PcapWriter};

pub const CLIENT_MAC: [u8; 6] = [0x00, 0x0b, 0x82, 0x01, 0xfc, 0x42];
const SERVER_MAC: [u8; 6] = [0x00, 0x08, 0x74, 0xad, 0xf1, 0x9b];
const BROADCAST: [u8; 4] = [255, 255, 255, 255];

pub fn path_as_str(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

/// Seconds after 2024-01-15 10:00:00 UTC.
pub fn at(secs: u64) -> Duration {
    Duration::new(1_705_312_800 + secs, 0)
}

pub fn udp_frame(src: [u8; 4], dst: [u8; 4], sport: u16, dport: u16, payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2(CLIENT_MAC, [0xff; 6])
        .ipv4(src, dst, 64)
        .udp(sport, dport);
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder
        .write(&mut frame, payload)
        .expect("frame should serialize");
    frame
}

fn bootp(op: u8, yiaddr: [u8; 4], options: &[u8]) -> Vec<u8> {
    let mut payload = vec![0u8; 236];
    payload[0] = op;
    payload[1] = 1;
    payload[2] = 6;
    payload[4..8].copy_from_slice(&0x3903_f326u32.to_be_bytes());
    payload[16..20].copy_from_slice(&yiaddr);
    payload[28..34].copy_from_slice(&CLIENT_MAC);
    payload.extend_from_slice(&[99, 130, 83, 99]);
    payload.extend_from_slice(options);
    payload.push(255);
    payload
}

pub fn discover() -> Vec<u8> {
    let payload = bootp(1, [0; 4], &[53, 1, 1, 50, 4, 192, 168, 0, 10]);
    udp_frame([0, 0, 0, 0], BROADCAST, 68, 67, &payload)
}

pub fn offer() -> Vec<u8> {
    let payload = bootp(2, [192, 168, 0, 10], &[53, 1, 2, 54, 4, 192, 168, 0, 1]);
    let builder = PacketBuilder::ethernet2(SERVER_MAC, CLIENT_MAC)
        .ipv4([192, 168, 0, 1], [192, 168, 0, 10], 64)
        .udp(67, 68);
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder
        .write(&mut frame, &payload)
        .expect("frame should serialize");
    frame
}

/// DHCP request whose requested-address option is cut short.
pub fn truncated_request() -> Vec<u8> {
    let mut payload = bootp(1, [0; 4], &[53, 1, 3]);
    payload.pop();
    payload.extend_from_slice(&[50, 4, 192]);
    udp_frame([0, 0, 0, 0], BROADCAST, 68, 67, &payload)
}

pub fn dns_query(name: &str) -> Vec<u8> {
    let mut payload = vec![0x12, 0x34, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0];
    for label in name.split('.') {
        payload.push(label.len() as u8);
        payload.extend_from_slice(label.as_bytes());
    }
    payload.extend_from_slice(&[0, 0, 1, 0, 1]);
    udp_frame([10, 0, 0, 5], [10, 0, 0, 1], 40000, 53, &payload)
}

/// Multicast DNS question from port 5353 to the mDNS group.
pub fn mdns_query(name: &str) -> Vec<u8> {
    let mut payload = vec![0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0];
    for label in name.split('.') {
        payload.push(label.len() as u8);
        payload.extend_from_slice(label.as_bytes());
    }
    payload.extend_from_slice(&[0, 0, 12, 0, 1]);
    udp_frame([192, 168, 0, 20], [224, 0, 0, 251], 5353, 5353, &payload)
}

/// Write an Ethernet pcap with the given frames.
pub fn write_capture(dir: &Path, name: &str, frames: &[(Duration, Vec<u8>)]) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).expect("create pcap");
    let mut writer = PcapWriter::new(file).expect("pcap header");
    for (ts, data) in frames {
        writer
            .write_packet(&PcapPacket::new(*ts, data.len() as u32, data))
            .expect("write packet");
    }
    path
}
