#![cfg_attr(docsrs, feature(doc_cfg))]
//! # gwbms_lib
//!
//! This crate decodes the parameter response frame of Greenway battery management systems
//! into a typed [`parameters::DeviceParameterRecord`].
//!
//! Decoding is a pure function over an in-memory buffer; receiving the frame from the device
//! is left to the caller.
//!
//! ```no_run
//! # fn frame() -> Vec<u8> { vec![0; 441] }
//! let record = gwbms_lib::decode(&frame())?;
//! println!("{} {}", record.battery_name, record.designed_capacity);
//! # Ok::<(), gwbms_lib::Error>(())
//! ```
//!
//! ## Features
//!
//! - `default`: Enables `bin-dependencies`, which is intended for compiling the `gwbms` command-line tool and pulls in `serde`.
//! - `serde`: Enables `serde` support for serializing/deserializing the decoded records.
//! - `bin-dependencies`: Enables all features required by the `gwbms` binary executable.

/// Contains error types for the library.
mod error;
/// Decoded parameter record of the device.
pub mod parameters;
/// Frame primitives, units and lookup tables of the wire format.
pub mod protocol;

pub use error::Error;

/// Decodes one complete parameter response frame.
///
/// Fails with [`Error::TruncatedFrame`] if the buffer is shorter than
/// [`protocol::FRAME_LENGTH`]; no partial record is returned.
pub fn decode(frame: &[u8]) -> std::result::Result<parameters::DeviceParameterRecord, Error> {
    parameters::DeviceParameterRecord::decode(frame)
}
