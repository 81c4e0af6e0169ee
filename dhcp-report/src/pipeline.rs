//! Capture-to-accumulator pipeline.
//!
//! The capture is read once, front to back. Each frame is dissected and
//! classified; successful classifications are folded into a [`RunContext`],
//! failures are counted and otherwise ignored.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use capture_core::{dissect, open_capture, CaptureFormat, CaptureReader, LayeredPacket, OpenError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::classify::{classify, Classification, ExtractionError};
use crate::event::DhcpEvent;

/// Failures that stop a run before any packet is processed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("capture file {} not found", .0.display())]
    MissingFile(PathBuf),
    #[error("failed to open capture {}: {source}", path.display())]
    CaptureOpen { path: PathBuf, source: OpenError },
}

/// Accumulated results of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    /// DHCP events in capture order.
    pub events: Vec<DhcpEvent>,
    /// Distinct IPv4 source/destination addresses.
    pub addresses: BTreeSet<String>,
    /// DNS query names in capture order, duplicates kept.
    pub dns_queries: Vec<String>,
    /// Frames dropped because they could not be decoded or classified.
    pub skipped: usize,
    /// Frames read from the capture, including skipped ones.
    pub frames: usize,
    pub format: Option<CaptureFormat>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one packet's classification into the collections.
    pub fn apply(&mut self, classification: Classification) {
        if let Some((src, dst)) = classification.endpoints {
            self.addresses.insert(src);
            self.addresses.insert(dst);
        }
        if let Some(query) = classification.dns_query {
            self.dns_queries.push(query);
        }
        if let Some(event) = classification.event {
            self.events.push(event);
        }
    }

    /// Classify and record a packet; on error nothing is recorded.
    pub fn ingest<P: LayeredPacket + ?Sized>(&mut self, packet: &P) -> Result<(), ExtractionError> {
        let classification = classify(packet)?;
        self.apply(classification);
        Ok(())
    }

    /// Number of packets that contributed an event or a DNS query.
    pub fn total_processed(&self) -> usize {
        self.events.len() + self.dns_queries.len()
    }
}

/// Open `path`, process every frame and close the capture.
pub fn analyze_capture(path: &Path) -> Result<RunContext, PipelineError> {
    if !path.is_file() {
        return Err(PipelineError::MissingFile(path.to_path_buf()));
    }

    let mut capture = open_capture(path).map_err(|source| PipelineError::CaptureOpen {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), format = ?capture.format(), "opened capture");

    let context = process_capture(&mut capture);
    capture.close();
    Ok(context)
}

/// Drain a capture into a new [`RunContext`].
///
/// A container-level read error ends the loop early; whatever was read up to
/// that point is kept.
pub fn process_capture<R: Read>(capture: &mut CaptureReader<R>) -> RunContext {
    let mut context = RunContext::new();
    context.format = Some(capture.format());

    while let Some(next) = capture.next_frame() {
        let frame = match next {
            Ok(frame) => frame,
            Err(err) => {
                warn!(error = %err, "stopping early, capture is truncated or corrupt");
                break;
            }
        };

        let outcome = dissect(&frame)
            .map_err(ExtractionError::from)
            .and_then(|packet| context.ingest(&packet));
        if let Err(err) = outcome {
            debug!(frame = frame.index, error = %err, "skipping packet");
            context.skipped += 1;
        }
    }

    context.frames = capture.frames_read();
    if context.skipped > 0 {
        warn!(
            skipped = context.skipped,
            frames = context.frames,
            "some packets could not be decoded and were left out"
        );
    }
    context
}
