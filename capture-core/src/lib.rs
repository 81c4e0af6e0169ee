//! Capture-file reading and dissection primitives used by higher-level tools.
//!
//! [`open_capture`] sniffs pcap vs pcapng and yields [`RawFrame`]s in file
//! order. [`dissect`] turns a frame into a [`DecodedPacket`]: a stack of named
//! [`Layer`]s whose fields are plain strings. Callers that only need to ask
//! "does this packet have layer X, and what is its field Y" should program
//! against the [`LayeredPacket`] trait.
//!
//! ```ignore
//! use capture_core::{dissect, open_capture, LayeredPacket};
//!
//! let mut capture = open_capture("dhcp.pcapng".as_ref())?;
//! while let Some(frame) = capture.next_frame() {
//!     let packet = dissect(&frame?)?;
//!     if packet.has_layer("DHCP") {
//!         println!("{:?}", packet.field("DHCP", "option_dhcp"));
//!     }
//! }
//! capture.close();
//! ```

pub mod dissect;
pub mod packet;
pub mod reader;

pub use dissect::{dissect, format_timestamp, DissectError};
pub use packet::{DecodedPacket, Layer, LayeredPacket};
pub use reader::{
    open_capture, CaptureFile, CaptureFormat, CaptureReader, OpenError, RawFrame, ReadError,
};
