use protoscan::{DecodeHandler, Decoder, Error, WireType};
use std::env;
use std::io::Read;

/// Prints every field of a payload without knowing its schema, choosing a
/// reader by the wire type of each occurrence.
struct DumpFields;

impl<'b> DecodeHandler<'b> for DumpFields
{
    fn process_field(&mut self, decoder: &mut Decoder<'b>, field_number: u32)
        -> Result<(), Error>
    {
        match decoder.wire_type() {
            Some(WireType::Varint) => println!(
                "{}: varint {}",
                field_number,
                decoder.read_uint64(field_number)?
            ),
            Some(WireType::Fixed64) => println!(
                "{}: fixed64 {:#018x}",
                field_number,
                decoder.read_fixed64(field_number)?
            ),
            Some(WireType::Fixed32) => println!(
                "{}: fixed32 {:#010x}",
                field_number,
                decoder.read_fixed32(field_number)?
            ),
            Some(WireType::LengthDelimited) => {
                let bytes = decoder.read_bytes(field_number)?;
                println!(
                    "{}: {} bytes {:?}",
                    field_number,
                    bytes.len(),
                    String::from_utf8_lossy(bytes)
                )
            }
            None => {}
        }

        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>>
{
    for path in env::args().skip(1) {
        let mut file = std::fs::File::open(path)?;
        let mut payload = Vec::new();
        file.read_to_end(&mut payload)?;

        let mut decoder = Decoder::new(&payload);
        decoder.decode(&mut DumpFields)?;
    }

    Ok(())
}
