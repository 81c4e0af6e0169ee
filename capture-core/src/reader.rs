use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::Path;
use std::time::Duration;

use pcap_file::pcap::PcapReader;
use pcap_file::pcapng::blocks::interface_description::{
    InterfaceDescriptionBlock, InterfaceDescriptionOption,
};
use pcap_file::pcapng::{Block, PcapNgReader};
use pcap_file::{DataLink, PcapError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

const PCAPNG_MAGIC: [u8; 4] = [0x0A, 0x0D, 0x0D, 0x0A];
const PCAP_MAGICS: [[u8; 4]; 4] = [
    [0xA1, 0xB2, 0xC3, 0xD4],
    [0xD4, 0xC3, 0xB2, 0xA1],
    [0xA1, 0xB2, 0x3C, 0x4D],
    [0x4D, 0x3C, 0xB2, 0xA1],
];

/// Errors that prevent a capture from being opened at all.
#[derive(Debug, Error)]
pub enum OpenError {
    /// Underlying file could not be read.
    #[error("failed to read capture: {0}")]
    Io(#[from] io::Error),
    /// Container header was recognised but rejected by the decoder.
    #[error("failed to decode capture header: {0}")]
    Pcap(#[from] PcapError),
    /// Leading bytes match neither pcap nor pcapng.
    #[error("not a pcap or pcapng capture: {0}")]
    UnknownFormat(String),
}

/// Error raised while pulling the next frame out of an open capture.
#[derive(Debug, Error)]
#[error("failed to read frame #{index}: {source}")]
pub struct ReadError {
    pub index: usize,
    pub source: PcapError,
}

/// Capture container flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureFormat {
    Pcap,
    PcapNg,
}

impl CaptureFormat {
    fn detect(magic: &[u8; 4]) -> Option<Self> {
        if *magic == PCAPNG_MAGIC {
            Some(Self::PcapNg)
        } else if PCAP_MAGICS.contains(magic) {
            Some(Self::Pcap)
        } else {
            None
        }
    }
}

/// One frame as stored in the capture, before dissection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub index: usize,
    /// Time since the Unix epoch.
    pub timestamp: Duration,
    pub linktype: DataLink,
    pub data: Vec<u8>,
}

type Peeked<R> = io::Chain<Cursor<[u8; 4]>, R>;

enum Source<R: Read> {
    Pcap {
        reader: PcapReader<Peeked<R>>,
        linktype: DataLink,
    },
    PcapNg {
        reader: PcapNgReader<Peeked<R>>,
        interfaces: Vec<Interface>,
        last_timestamp: Option<Duration>,
    },
}

/// Ticks per second of a pcapng interface clock (`if_tsresol`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TsResolution {
    /// 10^-n seconds per tick.
    Decimal(u8),
    /// 2^-n seconds per tick.
    Binary(u8),
}

impl TsResolution {
    /// Microseconds when the interface carries no `if_tsresol` option.
    const DEFAULT: Self = Self::Decimal(6);

    fn from_option(raw: u8) -> Self {
        if raw & 0x80 == 0 {
            Self::Decimal(raw)
        } else {
            Self::Binary(raw & 0x7F)
        }
    }

    fn to_duration(self, ticks: u64) -> Duration {
        let per_second = match self {
            Self::Decimal(exp) => 10u128.checked_pow(u32::from(exp)),
            Self::Binary(exp) => 1u128.checked_shl(u32::from(exp)),
        };
        let Some(per_second) = per_second else {
            return Duration::ZERO;
        };
        let ticks = u128::from(ticks);
        let secs = ticks / per_second;
        let nanos = (ticks % per_second) * 1_000_000_000 / per_second;
        Duration::new(secs as u64, nanos as u32)
    }
}

/// Link type and clock settings of one pcapng interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Interface {
    linktype: DataLink,
    resolution: TsResolution,
    offset_secs: u64,
}

impl Interface {
    fn from_block(block: &InterfaceDescriptionBlock<'_>) -> Self {
        let mut interface = Self {
            linktype: block.linktype,
            resolution: TsResolution::DEFAULT,
            offset_secs: 0,
        };
        for option in &block.options {
            match option {
                InterfaceDescriptionOption::IfTsResol(raw) => {
                    interface.resolution = TsResolution::from_option(*raw)
                }
                InterfaceDescriptionOption::IfTsOffset(secs) => interface.offset_secs = *secs,
                _ => {}
            }
        }
        interface
    }

    /// Convert the raw 64-bit tick count of an Enhanced Packet Block.
    fn timestamp(&self, ticks: u64) -> Duration {
        self.resolution.to_duration(ticks) + Duration::from_secs(self.offset_secs)
    }
}

/// Sequential reader over a pcap or pcapng stream.
pub struct CaptureReader<R: Read> {
    format: CaptureFormat,
    source: Source<R>,
    next_index: usize,
}

/// Capture reader backed by a file on disk.
pub type CaptureFile = CaptureReader<BufReader<File>>;

/// Open a capture file, sniffing the container format from its magic number.
pub fn open_capture(path: &Path) -> Result<CaptureFile, OpenError> {
    let file = File::open(path)?;
    CaptureReader::new(BufReader::new(file))
}

impl<R: Read> CaptureReader<R> {
    /// Wrap a byte stream positioned at the start of a capture.
    pub fn new(mut inner: R) -> Result<Self, OpenError> {
        let mut magic = [0u8; 4];
        inner.read_exact(&mut magic).map_err(|err| {
            if err.kind() == io::ErrorKind::UnexpectedEof {
                OpenError::UnknownFormat("input is shorter than a capture header".to_string())
            } else {
                OpenError::Io(err)
            }
        })?;

        let format = CaptureFormat::detect(&magic).ok_or_else(|| {
            OpenError::UnknownFormat(format!(
                "unrecognised magic {:02x}{:02x}{:02x}{:02x}",
                magic[0], magic[1], magic[2], magic[3]
            ))
        })?;
        let stream = Cursor::new(magic).chain(inner);

        let source = match format {
            CaptureFormat::Pcap => {
                let reader = PcapReader::new(stream)?;
                let linktype = reader.header().datalink;
                debug!(?linktype, "opened pcap capture");
                Source::Pcap { reader, linktype }
            }
            CaptureFormat::PcapNg => {
                let reader = PcapNgReader::new(stream)?;
                debug!("opened pcapng capture");
                Source::PcapNg {
                    reader,
                    interfaces: Vec::new(),
                    last_timestamp: None,
                }
            }
        };

        Ok(Self {
            format,
            source,
            next_index: 0,
        })
    }

    pub fn format(&self) -> CaptureFormat {
        self.format
    }

    /// Number of frames handed out so far.
    pub fn frames_read(&self) -> usize {
        self.next_index
    }

    /// Return the next packet-carrying frame, or `None` at end of capture.
    ///
    /// pcapng metadata blocks are consumed silently; interface descriptions
    /// set the link type and clock used for subsequent packets.
    pub fn next_frame(&mut self) -> Option<Result<RawFrame, ReadError>> {
        let index = self.next_index;
        let frame = match &mut self.source {
            Source::Pcap { reader, linktype } => match reader.next_packet()? {
                Ok(packet) => RawFrame {
                    index,
                    timestamp: packet.timestamp,
                    linktype: *linktype,
                    data: packet.data.into_owned(),
                },
                Err(source) => return Some(Err(ReadError { index, source })),
            },
            Source::PcapNg {
                reader,
                interfaces,
                last_timestamp,
            } => loop {
                let block = match reader.next_block()? {
                    Ok(block) => block,
                    Err(source) => return Some(Err(ReadError { index, source })),
                };
                match block {
                    Block::SectionHeader(_) => interfaces.clear(),
                    Block::InterfaceDescription(block) => {
                        let interface = Interface::from_block(&block);
                        debug!(?interface, "pcapng interface");
                        interfaces.push(interface);
                    }
                    Block::EnhancedPacket(packet) => {
                        let interface = interface_at(interfaces, packet.interface_id);
                        // pcap-file hands back the raw tick count as nanoseconds.
                        let ticks = u64::try_from(packet.timestamp.as_nanos()).unwrap_or(u64::MAX);
                        let timestamp = interface.timestamp(ticks);
                        *last_timestamp = Some(timestamp);
                        break RawFrame {
                            index,
                            timestamp,
                            linktype: interface.linktype,
                            data: packet.data.into_owned(),
                        };
                    }
                    Block::SimplePacket(packet) => {
                        // No timestamp on the wire; reuse the previous packet's.
                        let timestamp = (*last_timestamp).unwrap_or_else(|| {
                            warn!(frame = index, "simple packet block before any timestamp");
                            Duration::ZERO
                        });
                        break RawFrame {
                            index,
                            timestamp,
                            linktype: interface_at(interfaces, 0).linktype,
                            data: packet.data.into_owned(),
                        };
                    }
                    _ => {}
                }
            },
        };

        self.next_index += 1;
        Some(Ok(frame))
    }

    /// Release the underlying stream and return the number of frames read.
    pub fn close(self) -> usize {
        debug!(frames = self.next_index, "closed capture");
        self.next_index
    }
}

fn interface_at(interfaces: &[Interface], interface_id: u32) -> Interface {
    interfaces
        .get(interface_id as usize)
        .copied()
        .unwrap_or(Interface {
            linktype: DataLink::ETHERNET,
            resolution: TsResolution::DEFAULT,
            offset_secs: 0,
        })
}
