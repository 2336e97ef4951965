//!
//! Protoscan is a streaming, zero-copy decoder for the protocol buffer
//! binary wire format. Instead of materializing a decoded message tree it
//! walks the payload one field at a time and hands each occurrence to a
//! caller supplied handler, which reads the values it cares about straight
//! out of the buffer. Nothing is copied and nothing is allocated, which
//! makes the decoder usable on payloads of any size and in constrained
//! environments.
//!
//! The handler decides per field whether to consume the value through one
//! of the typed readers or to leave it alone, in which case the engine
//! skips it by wire type. Returning an error from the handler stops
//! decoding early and surfaces that error as the decode result.
//!
//! ```
//! use protoscan::{DecodeHandler, Decoder, Error};
//!
//! #[derive(Default)]
//! struct Request<'b>
//! {
//!     distance: i32,
//!     kind: Option<&'b str>,
//! }
//!
//! impl<'b> DecodeHandler<'b> for Request<'b>
//! {
//!     fn process_field(&mut self, decoder: &mut Decoder<'b>, field_number: u32)
//!         -> Result<(), Error>
//!     {
//!         match field_number {
//!             1 => self.distance = decoder.read_int32(field_number)?,
//!             2 => self.kind = Some(decoder.read_string(field_number)?),
//!             _ => {}
//!         }
//!
//!         Ok(())
//!     }
//! }
//!
//! let payload = b"\x08\x2a\x12\x05Hello";
//!
//! let mut request = Request::default();
//! let mut decoder = Decoder::new(payload);
//! decoder.decode(&mut request).unwrap();
//!
//! assert_eq!(request.distance, 42);
//! assert_eq!(request.kind, Some("Hello"));
//! ```
#![warn(missing_docs)]

pub mod decode;
pub mod wire;

pub use crate::decode::{DecodeHandler, Decoder, Error};
pub use crate::wire::{Tag, WireType};
