//! DHCP/BOOTP and DNS activity report for packet captures.
//!
//! The binary reads a pcap or pcapng file through `capture-core`, turns the
//! decoded packets into DHCP events, DNS query names and a set of IPv4
//! addresses, then prints a console report, writes the events as CSV and
//! draws a message-type chart.
//!
//! # Layout
//!
//! - [`classify`]: per-packet extraction from decoded layers
//! - [`event`]: the [`event::DhcpEvent`] record and its label mappings
//! - [`pipeline`]: reads a capture and accumulates a [`pipeline::RunContext`]
//! - [`stats`]: per-type counts and time ordering
//! - [`report`]: console rendering
//! - [`chart`]: terminal and SVG bar chart
//! - [`export`]: CSV and SVG files
//! - [`styles`]: colors for the table and chart, loaded from TOML

pub mod chart;
pub mod classify;
pub mod event;
pub mod export;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod styles;
