//! File outputs: the events CSV and the SVG chart.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::chart::{render_svg, BarChart};
use crate::event::DhcpEvent;

/// Errors returned when writing an output file.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV {path}: {source}")]
    Csv { path: String, source: csv::Error },
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Write `events` to `path` as CSV with a header row, replacing any existing file.
pub fn write_events_csv(path: &Path, events: &[DhcpEvent]) -> Result<(), ExportError> {
    let csv_err = |source: csv::Error| ExportError::Csv {
        path: path.display().to_string(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for event in events {
        writer.serialize(event).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Write the chart as a standalone SVG document.
pub fn write_chart_svg(path: &Path, chart: &BarChart) -> Result<(), ExportError> {
    fs::write(path, render_svg(chart)).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::write_events_csv;
    use crate::event::DhcpEvent;

    fn event(time: &str, dhcp_type: &str, chaddr: &str) -> DhcpEvent {
        DhcpEvent {
            time: time.to_string(),
            src: "0.0.0.0".to_string(),
            dst: "255.255.255.255".to_string(),
            bootp_op: "Boot Request (1)".to_string(),
            dhcp_type: dhcp_type.to_string(),
            ciaddr: "0.0.0.0".to_string(),
            yiaddr: String::new(),
            siaddr: String::new(),
            giaddr: String::new(),
            chaddr: chaddr.to_string(),
            requested_ip: String::new(),
        }
    }

    #[test]
    fn writes_header_and_rows_in_given_order() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("events.csv");
        fs::write(&path, "stale contents\nfrom a previous run\n").expect("seed");

        write_events_csv(
            &path,
            &[
                event("2024-01-15 10:00:01.000000", "Discover", "00:0b:82:01:fc:42"),
                event("2024-01-15 10:00:02.000000", "a,b", ""),
            ],
        )
        .expect("write csv");

        let text = fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "time,src,dst,bootp_op,dhcp_type,ciaddr,yiaddr,siaddr,giaddr,chaddr,requested_ip"
        );
        assert_eq!(
            lines[1],
            "2024-01-15 10:00:01.000000,0.0.0.0,255.255.255.255,Boot Request (1),Discover,0.0.0.0,,,,00:0b:82:01:fc:42,"
        );
        assert!(lines[2].contains(",\"a,b\","));
    }
}
