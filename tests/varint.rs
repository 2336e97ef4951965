use protoscan::wire::{self, Tag, WireType};

#[test]
fn varint_decoding()
{
    let mut data: &[u8] = b"\x2a";
    assert_eq!(wire::decode_varint(&mut data), Some(42));
    assert!(data.is_empty());

    // Trailing bytes are left for the next read.
    let mut data: &[u8] = b"\xac\x02\xff";
    assert_eq!(wire::decode_varint(&mut data), Some(300));
    assert_eq!(data, b"\xff");

    // The largest value takes the full ten bytes.
    let mut data: &[u8] = b"\xff\xff\xff\xff\xff\xff\xff\xff\xff\x01";
    assert_eq!(wire::decode_varint(&mut data), Some(u64::MAX));
    assert!(data.is_empty());
}

#[test]
fn varint_rejects_malformed_input()
{
    // Continuation bit set on the last available byte.
    let mut data: &[u8] = b"\x80\x80";
    assert_eq!(wire::decode_varint(&mut data), None);

    // A failed decode leaves the cursor where it was.
    assert_eq!(data, b"\x80\x80");

    // Ten continuation bytes exhaust a 64-bit value.
    let mut data: &[u8] = b"\x80\x80\x80\x80\x80\x80\x80\x80\x80\x80\x01";
    assert_eq!(wire::decode_varint(&mut data), None);

    let mut data: &[u8] = b"";
    assert_eq!(wire::decode_varint(&mut data), None);
}

#[test]
fn varint_roundtrip()
{
    let mut output = Vec::new();
    for value in &[0u64, 1, 127, 128, 300, 1 << 32, u64::MAX] {
        output.clear();
        wire::encode_varint(*value, &mut output);

        let mut data = &output[..];
        assert_eq!(wire::decode_varint(&mut data), Some(*value));
        assert!(data.is_empty());
    }
}

#[test]
fn zigzag()
{
    assert_eq!(wire::zigzag_decode(0), 0);
    assert_eq!(wire::zigzag_decode(1), -1);
    assert_eq!(wire::zigzag_decode(2), 1);
    assert_eq!(wire::zigzag_decode(25), -13);

    assert_eq!(wire::zigzag_encode(-13), 25);
    assert_eq!(wire::zigzag_encode(0), 0);

    assert_eq!(wire::zigzag_decode(wire::zigzag_encode(i64::MIN)), i64::MIN);
    assert_eq!(wire::zigzag_decode(wire::zigzag_encode(i64::MAX)), i64::MAX);
}

#[test]
fn tag_splitting()
{
    assert_eq!(
        Tag::from_varint(0x08),
        Some(Tag {
            field_number: 1,
            wire_type: WireType::Varint,
        })
    );
    assert_eq!(
        Tag::from_varint(5 << 3 | 5),
        Some(Tag {
            field_number: 5,
            wire_type: WireType::Fixed32,
        })
    );

    // Field number zero is structurally valid.
    assert_eq!(
        Tag::from_varint(2),
        Some(Tag {
            field_number: 0,
            wire_type: WireType::LengthDelimited,
        })
    );

    // Wire types 3, 4, 6 and 7 name no supported encoding.
    assert_eq!(Tag::from_varint(1 << 3 | 3), None);
    assert_eq!(Tag::from_varint(1 << 3 | 4), None);
    assert_eq!(Tag::from_varint(1 << 3 | 6), None);
    assert_eq!(Tag::from_varint(1 << 3 | 7), None);

    // A field number that does not fit u32 is rejected rather than
    // silently truncated.
    assert_eq!(Tag::from_varint(u64::MAX & !0x7), None);
    assert_eq!(
        Tag::from_varint((u64::from(u32::MAX) << 3) | 1),
        Some(Tag {
            field_number: u32::MAX,
            wire_type: WireType::Fixed64,
        })
    );
}
