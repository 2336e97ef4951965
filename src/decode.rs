//! Streaming decoding of wire format payloads.
//!
//! The decoder walks a payload tag by tag and hands each field occurrence
//! to a caller supplied [`DecodeHandler`]. The handler pulls the values it
//! cares about through the typed readers on [`Decoder`]; anything it leaves
//! alone is skipped by wire type without being interpreted. See the example
//! in the [crate root](crate).

use crate::wire::{self, Tag, WireType};
use snafu::{ensure, OptionExt, ResultExt, Snafu};

/// Decoding error type.
///
/// Everything except [`Error::Cancelled`] describes malformed input; see
/// [`Error::is_data_loss`].
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error
{
    /// A varint ran past the end of the payload, or past the ten byte
    /// limit of a 64-bit value.
    #[snafu(display("Malformed varint at offset {}", offset))]
    InvalidVarint
    {
        /// Offset of the first varint byte.
        offset: usize,
    },

    /// A tag carried wire type bits that name no known encoding, or a
    /// field number too large to represent.
    #[snafu(display("Invalid tag at offset {}", offset))]
    InvalidTag
    {
        /// Offset of the first tag byte.
        offset: usize,
    },

    /// A value needed more bytes than the payload has left.
    #[snafu(display("Value at offset {} extends past the end of the payload", offset))]
    Truncated
    {
        /// Offset of the first value byte.
        offset: usize,
    },

    /// A typed read required a different wire type than the field was
    /// encoded with. The value remains unconsumed and can still be
    /// skipped.
    #[snafu(display(
        "Field {} has wire type {:?}, expected {:?}",
        field_number,
        actual,
        expected
    ))]
    WireTypeMismatch
    {
        /// Field that was being read.
        field_number: u32,

        /// Wire type the reader requires.
        expected: WireType,

        /// Wire type the field was encoded with.
        actual: WireType,
    },

    /// A typed read named a field other than the one being dispatched, ran
    /// outside a dispatch entirely, or re-read a value that was already
    /// consumed.
    #[snafu(display("Field {} is not the field being dispatched", field_number))]
    InactiveField
    {
        /// Field the reader asked for.
        field_number: u32,
    },

    /// A string read found content that is not valid UTF-8.
    #[snafu(display("Field {} does not hold valid UTF-8", field_number))]
    InvalidString
    {
        /// Field that was being read.
        field_number: u32,

        /// Underlying validation error.
        source: std::str::Utf8Error,
    },

    /// Decoding was halted at the handler's request.
    ///
    /// The engine never produces this value on its own. It is the
    /// conventional status for a handler that has seen everything it
    /// needs, though any error returned from a handler stops decoding the
    /// same way.
    #[snafu(display("Decoding was cancelled by the handler"))]
    Cancelled,
}

impl Error
{
    /// True if the error describes malformed or truncated input rather
    /// than a handler deciding to stop.
    pub fn is_data_loss(&self) -> bool
    {
        match self {
            Error::Cancelled => false,
            _ => true,
        }
    }
}

/// Callback capability invoked once per field occurrence.
///
/// `'b` is the payload's lifetime: slice views handed out by
/// [`Decoder::read_bytes`] and [`Decoder::read_string`] borrow from the
/// payload, so a handler may store them for as long as the payload lives.
pub trait DecodeHandler<'b>
{
    /// Process a single field occurrence.
    ///
    /// The typed readers on `decoder` are scoped to the occurrence being
    /// dispatched. A field whose value is not read here is skipped by the
    /// engine once the callback returns. Returning an error stops decoding
    /// and becomes the result of [`Decoder::decode`] as is.
    fn process_field(&mut self, decoder: &mut Decoder<'b>, field_number: u32)
        -> Result<(), Error>;
}

#[derive(Debug, Clone, Copy)]
struct Occurrence
{
    tag: Tag,
    consumed: bool,
}

/// Streaming zero-copy decoder over a single payload.
///
/// The decoder borrows the payload and never copies from it; reads of
/// length-delimited fields hand out sub-slices of the original buffer. All
/// cursor state lives in the decoder itself, so decoding performs no
/// allocation. A fresh payload gets a fresh decoder; construction is free.
#[derive(Debug)]
pub struct Decoder<'b>
{
    data: &'b [u8],
    remaining: &'b [u8],
    field: Option<Occurrence>,
}

impl<'b> Decoder<'b>
{
    /// Create a decoder over a payload.
    pub fn new(data: &'b [u8]) -> Self
    {
        Decoder {
            data,
            remaining: data,
            field: None,
        }
    }

    /// Decode the payload, dispatching every field occurrence to `handler`
    /// in payload order.
    ///
    /// Returns `Ok(())` once the payload is fully consumed. Decoding stops
    /// at the first error: either malformed input, or a non-`Ok` status
    /// from the handler, which is propagated unchanged. Fields the handler
    /// processed before the stop point keep whatever effect they had.
    ///
    /// Calling `decode` again rescans the payload from the start.
    pub fn decode(&mut self, handler: &mut dyn DecodeHandler<'b>) -> Result<(), Error>
    {
        self.remaining = self.data;
        self.field = None;

        loop {
            if self.remaining.is_empty() {
                return Ok(());
            }

            let offset = self.offset();
            let raw = wire::decode_varint(&mut self.remaining)
                .context(InvalidVarint { offset })?;
            let tag = Tag::from_varint(raw).context(InvalidTag { offset })?;

            self.field = Some(Occurrence {
                tag,
                consumed: false,
            });
            let status = handler.process_field(self, tag.field_number);

            let consumed = self.field.take().map_or(false, |f| f.consumed);
            if !consumed {
                self.skip(tag.wire_type)?;
            }

            status?;
        }
    }

    /// Wire type of the field currently being dispatched.
    ///
    /// `None` outside a [`DecodeHandler::process_field`] invocation. This
    /// is what lets a schema-less consumer pick a matching reader for any
    /// field it encounters.
    pub fn wire_type(&self) -> Option<WireType>
    {
        self.field.map(|f| f.tag.wire_type)
    }

    /// Read an `int32` field. Requires the varint wire type.
    ///
    /// Varints always travel in 64-bit width; the narrow read keeps the
    /// low 32 bits.
    pub fn read_int32(&mut self, field_number: u32) -> Result<i32, Error>
    {
        self.read_varint(field_number).map(|v| v as i32)
    }

    /// Read an `int64` field. Requires the varint wire type.
    pub fn read_int64(&mut self, field_number: u32) -> Result<i64, Error>
    {
        self.read_varint(field_number).map(|v| v as i64)
    }

    /// Read a `uint32` field. Requires the varint wire type.
    pub fn read_uint32(&mut self, field_number: u32) -> Result<u32, Error>
    {
        self.read_varint(field_number).map(|v| v as u32)
    }

    /// Read a `uint64` field. Requires the varint wire type.
    pub fn read_uint64(&mut self, field_number: u32) -> Result<u64, Error>
    {
        self.read_varint(field_number)
    }

    /// Read a zigzag encoded `sint32` field. Requires the varint wire
    /// type.
    pub fn read_sint32(&mut self, field_number: u32) -> Result<i32, Error>
    {
        self.read_varint(field_number)
            .map(|v| wire::zigzag_decode(v) as i32)
    }

    /// Read a zigzag encoded `sint64` field. Requires the varint wire
    /// type.
    pub fn read_sint64(&mut self, field_number: u32) -> Result<i64, Error>
    {
        self.read_varint(field_number).map(wire::zigzag_decode)
    }

    /// Read a `bool` field. Requires the varint wire type; any non-zero
    /// value is `true`.
    pub fn read_bool(&mut self, field_number: u32) -> Result<bool, Error>
    {
        self.read_varint(field_number).map(|v| v != 0)
    }

    /// Read a `fixed32` field. Requires the 32-bit wire type.
    pub fn read_fixed32(&mut self, field_number: u32) -> Result<u32, Error>
    {
        self.read_four_bytes(field_number).map(u32::from_le_bytes)
    }

    /// Read an `sfixed32` field. Requires the 32-bit wire type.
    pub fn read_sfixed32(&mut self, field_number: u32) -> Result<i32, Error>
    {
        self.read_four_bytes(field_number).map(i32::from_le_bytes)
    }

    /// Read a `float` field. Requires the 32-bit wire type.
    pub fn read_float(&mut self, field_number: u32) -> Result<f32, Error>
    {
        self.read_four_bytes(field_number).map(f32::from_le_bytes)
    }

    /// Read a `fixed64` field. Requires the 64-bit wire type.
    pub fn read_fixed64(&mut self, field_number: u32) -> Result<u64, Error>
    {
        self.read_eight_bytes(field_number).map(u64::from_le_bytes)
    }

    /// Read an `sfixed64` field. Requires the 64-bit wire type.
    pub fn read_sfixed64(&mut self, field_number: u32) -> Result<i64, Error>
    {
        self.read_eight_bytes(field_number).map(i64::from_le_bytes)
    }

    /// Read a `double` field. Requires the 64-bit wire type.
    pub fn read_double(&mut self, field_number: u32) -> Result<f64, Error>
    {
        self.read_eight_bytes(field_number).map(f64::from_le_bytes)
    }

    /// Read a `bytes` field as a view into the payload. Requires the
    /// length-delimited wire type.
    ///
    /// The slice borrows from the payload and stays valid for as long as
    /// the payload does. A nested message travels as such a field; its
    /// slice can be handed to a fresh [`Decoder`] to walk the inner
    /// fields.
    pub fn read_bytes(&mut self, field_number: u32) -> Result<&'b [u8], Error>
    {
        self.read_delimited(field_number)
    }

    /// Read a `string` field as a view into the payload. Requires the
    /// length-delimited wire type and valid UTF-8 content.
    ///
    /// No copy is made and no terminator is added; the `str` points into
    /// the payload.
    pub fn read_string(&mut self, field_number: u32) -> Result<&'b str, Error>
    {
        let bytes = self.read_delimited(field_number)?;
        std::str::from_utf8(bytes).context(InvalidString { field_number })
    }

    fn offset(&self) -> usize
    {
        self.data.len() - self.remaining.len()
    }

    /// Checks that `field_number` names the occurrence being dispatched,
    /// that its value has not been read yet and that its wire type matches
    /// the reader. Leaves the cursor untouched.
    fn begin_read(&self, field_number: u32, expected: WireType) -> Result<(), Error>
    {
        let field = self
            .field
            .filter(|f| !f.consumed)
            .context(InactiveField { field_number })?;

        ensure!(
            field.tag.field_number == field_number,
            InactiveField { field_number }
        );
        ensure!(
            field.tag.wire_type == expected,
            WireTypeMismatch {
                field_number,
                expected,
                actual: field.tag.wire_type,
            }
        );

        Ok(())
    }

    fn mark_consumed(&mut self)
    {
        if let Some(field) = self.field.as_mut() {
            field.consumed = true;
        }
    }

    fn read_varint(&mut self, field_number: u32) -> Result<u64, Error>
    {
        self.begin_read(field_number, WireType::Varint)?;

        let offset = self.offset();
        let value = wire::decode_varint(&mut self.remaining)
            .context(InvalidVarint { offset })?;

        self.mark_consumed();
        Ok(value)
    }

    fn read_four_bytes(&mut self, field_number: u32) -> Result<[u8; 4], Error>
    {
        self.begin_read(field_number, WireType::Fixed32)?;

        let offset = self.offset();
        let bytes = wire::take_fixed32(&mut self.remaining).context(Truncated { offset })?;

        self.mark_consumed();
        Ok(bytes)
    }

    fn read_eight_bytes(&mut self, field_number: u32) -> Result<[u8; 8], Error>
    {
        self.begin_read(field_number, WireType::Fixed64)?;

        let offset = self.offset();
        let bytes = wire::take_fixed64(&mut self.remaining).context(Truncated { offset })?;

        self.mark_consumed();
        Ok(bytes)
    }

    fn read_delimited(&mut self, field_number: u32) -> Result<&'b [u8], Error>
    {
        self.begin_read(field_number, WireType::LengthDelimited)?;

        let offset = self.offset();
        let original = self.remaining;
        let length = wire::decode_varint(&mut self.remaining)
            .context(InvalidVarint { offset })?;

        if (self.remaining.len() as u64) < length {
            self.remaining = original;
            return Truncated { offset }.fail();
        }

        let (value, rest) = self.remaining.split_at(length as usize);
        self.remaining = rest;

        self.mark_consumed();
        Ok(value)
    }

    /// Advances past a value based on its wire type alone. This is what
    /// lets fields the handler never asked for go by without any schema
    /// knowledge.
    fn skip(&mut self, wire_type: WireType) -> Result<(), Error>
    {
        let offset = self.offset();
        match wire_type {
            WireType::Varint => {
                wire::decode_varint(&mut self.remaining)
                    .context(InvalidVarint { offset })?;
            }
            WireType::Fixed64 => {
                wire::take_fixed64(&mut self.remaining).context(Truncated { offset })?;
            }
            WireType::Fixed32 => {
                wire::take_fixed32(&mut self.remaining).context(Truncated { offset })?;
            }
            WireType::LengthDelimited => {
                let length = wire::decode_varint(&mut self.remaining)
                    .context(InvalidVarint { offset })?;

                if (self.remaining.len() as u64) < length {
                    return Truncated { offset }.fail();
                }
                self.remaining = &self.remaining[length as usize..];
            }
        }

        Ok(())
    }
}
