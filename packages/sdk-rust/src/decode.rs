//! Generic record decoder driven by [`Schema`] descriptors.
//!
//! [`decode`] walks a schema's fields in order and produces a [`Record`];
//! [`encode`] is its exact inverse and is what test fixtures are built with.

use solana_sdk::pubkey::Pubkey;

use crate::error::{Error, Result};
use crate::schema::{Field, FieldKind, FlagLayout, Schema};

// ─── Values ───────────────────────────────────────────────────────────────────

/// Decoded flag block.  Keeps the raw bits so padding survives a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagBits {
    pub layout: FlagLayout,
    pub raw:    u64,
}

impl FlagBits {
    /// Build a flag block from named flags; padding bits are left clear.
    pub fn from_names(layout: FlagLayout, set: &[&str]) -> Self {
        let raw = layout
            .names
            .iter()
            .enumerate()
            .filter(|(_, name)| set.contains(*name))
            .fold(0u64, |acc, (bit, _)| acc | (1 << bit));
        Self { layout, raw }
    }

    pub fn get(&self, name: &str) -> bool {
        self.layout
            .names
            .iter()
            .position(|n| *n == name)
            .map(|bit| self.raw & (1 << bit) != 0)
            .unwrap_or(false)
    }

    /// Bits above the named flags.
    pub fn padding(&self) -> u64 {
        self.raw & !named_mask(&self.layout)
    }
}

fn named_mask(layout: &FlagLayout) -> u64 {
    let n = layout.names.len();
    if n >= 64 { u64::MAX } else { (1u64 << n) - 1 }
}

/// One decoded field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    U8(u8),
    U32(u32),
    U64(u64),
    U128(u128),
    Pubkey(Pubkey),
    Bytes(Vec<u8>),
    U64Array(Vec<u64>),
    U128Array(Vec<u128>),
    Flags(FlagBits),
}

// ─── Record ───────────────────────────────────────────────────────────────────

/// A decoded buffer: named values in schema order.  Padding and constant
/// fields carry no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub schema: &'static Schema,
    values:     Vec<(&'static str, Value)>,
}

macro_rules! accessor {
    ($fn_name:ident, $variant:ident, $ty:ty, $label:literal) => {
        pub fn $fn_name(&self, name: &str) -> Result<$ty> {
            let (field, value) = self.lookup(name)?;
            match value {
                Value::$variant(v) => Ok(v.clone()),
                _ => Err(self.type_error(field, $label)),
            }
        }
    };
}

impl Record {
    /// An all-zero record for `schema`, with flag blocks cleared.
    pub fn zeroed(schema: &'static Schema) -> Self {
        let values = schema
            .fields
            .iter()
            .filter_map(|field| zero_value(field).map(|v| (field.name, v)))
            .collect();
        Self { schema, values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Replace a field's value; the new value must have the declared kind.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let field = self.schema.field(name).ok_or_else(|| Error::FieldMissing {
            schema: self.schema.name,
            field:  name.to_string(),
        })?;
        if !value_fits(&field.kind, &value) {
            return Err(self.type_error(field.name, kind_label(&field.kind)));
        }
        let slot = self
            .values
            .iter_mut()
            .find(|(n, _)| *n == field.name)
            .ok_or_else(|| Error::FieldMissing {
                schema: self.schema.name,
                field:  name.to_string(),
            })?;
        slot.1 = value;
        Ok(())
    }

    /// Builder-style [`Record::set`].
    pub fn with(mut self, name: &str, value: Value) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    accessor!(u8, U8, u8, "u8");
    accessor!(u32, U32, u32, "u32");
    accessor!(u64, U64, u64, "u64");
    accessor!(u128, U128, u128, "u128");
    accessor!(pubkey, Pubkey, Pubkey, "pubkey");
    accessor!(bytes, Bytes, Vec<u8>, "byte string");
    accessor!(u64_array, U64Array, Vec<u64>, "u64 array");
    accessor!(u128_array, U128Array, Vec<u128>, "u128 array");
    accessor!(flags, Flags, FlagBits, "flag set");

    /// Fixed-width byte field copied into an array.
    pub fn byte_array<const N: usize>(&self, name: &str) -> Result<[u8; N]> {
        let bytes = self.bytes(name)?;
        bytes.as_slice().try_into().map_err(|_| Error::FieldType {
            schema:   self.schema.name,
            field:    self.lookup(name).map(|(f, _)| f).unwrap_or(""),
            expected: "byte array of matching width",
        })
    }

    pub fn values(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.values.iter().map(|(n, v)| (*n, v))
    }

    fn lookup(&self, name: &str) -> Result<(&'static str, &Value)> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(n, v)| (*n, v))
            .ok_or_else(|| Error::FieldMissing {
                schema: self.schema.name,
                field:  name.to_string(),
            })
    }

    fn type_error(&self, field: &'static str, expected: &'static str) -> Error {
        Error::FieldType { schema: self.schema.name, field, expected }
    }
}

fn zero_value(field: &Field) -> Option<Value> {
    Some(match field.kind {
        FieldKind::U8 => Value::U8(0),
        FieldKind::U32 => Value::U32(0),
        FieldKind::U64 => Value::U64(0),
        FieldKind::U128 | FieldKind::U128Be => Value::U128(0),
        FieldKind::Pubkey => Value::Pubkey(Pubkey::default()),
        FieldKind::Bytes(n) => Value::Bytes(vec![0; n]),
        FieldKind::U64Array(n) => Value::U64Array(vec![0; n]),
        FieldKind::U128BeArray(n) => Value::U128Array(vec![0; n]),
        FieldKind::Flags(layout) => Value::Flags(FlagBits { layout, raw: 0 }),
        FieldKind::Padding(_) | FieldKind::Const(_) => return None,
    })
}

fn value_fits(kind: &FieldKind, value: &Value) -> bool {
    match (kind, value) {
        (FieldKind::U8, Value::U8(_))
        | (FieldKind::U32, Value::U32(_))
        | (FieldKind::U64, Value::U64(_))
        | (FieldKind::U128 | FieldKind::U128Be, Value::U128(_))
        | (FieldKind::Pubkey, Value::Pubkey(_)) => true,
        (FieldKind::Bytes(n), Value::Bytes(b)) => b.len() == *n,
        (FieldKind::U64Array(n), Value::U64Array(v)) => v.len() == *n,
        (FieldKind::U128BeArray(n), Value::U128Array(v)) => v.len() == *n,
        (FieldKind::Flags(layout), Value::Flags(bits)) => bits.layout == *layout,
        _ => false,
    }
}

fn kind_label(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::U8 => "u8",
        FieldKind::U32 => "u32",
        FieldKind::U64 => "u64",
        FieldKind::U128 | FieldKind::U128Be => "u128",
        FieldKind::Pubkey => "pubkey",
        FieldKind::Bytes(_) => "byte string",
        FieldKind::U64Array(_) => "u64 array",
        FieldKind::U128BeArray(_) => "u128 array",
        FieldKind::Flags(_) => "flag set",
        FieldKind::Padding(_) | FieldKind::Const(_) => "settable field",
    }
}

// ─── Decode ───────────────────────────────────────────────────────────────────

/// Decode `data` with `schema`.
///
/// Fails with [`Error::DecodeTruncated`] before reading anything when the
/// buffer is shorter than the schema span; bytes past the span are ignored.
pub fn decode(data: &[u8], schema: &'static Schema) -> Result<Record> {
    let span = schema.span();
    if data.len() < span {
        return Err(Error::DecodeTruncated {
            schema:   schema.name,
            expected: span,
            actual:   data.len(),
        });
    }

    let mut values = Vec::with_capacity(schema.fields.len());
    let mut offset = 0;
    for field in schema.fields {
        let width = field.kind.width();
        let chunk = &data[offset..offset + width];
        match field.kind {
            FieldKind::U8 => values.push((field.name, Value::U8(chunk[0]))),
            FieldKind::U32 => values.push((field.name, Value::U32(u32::from_le_bytes(le(chunk))))),
            FieldKind::U64 => values.push((field.name, Value::U64(u64::from_le_bytes(le(chunk))))),
            FieldKind::U128 => {
                values.push((field.name, Value::U128(u128::from_le_bytes(le(chunk)))))
            }
            FieldKind::U128Be => {
                values.push((field.name, Value::U128(u128::from_be_bytes(le(chunk)))))
            }
            FieldKind::Pubkey => {
                values.push((field.name, Value::Pubkey(Pubkey::new_from_array(le(chunk)))))
            }
            FieldKind::Bytes(_) => values.push((field.name, Value::Bytes(chunk.to_vec()))),
            FieldKind::U64Array(_) => {
                let items = chunk.chunks_exact(8).map(|c| u64::from_le_bytes(le(c))).collect();
                values.push((field.name, Value::U64Array(items)));
            }
            FieldKind::U128BeArray(_) => {
                let items = chunk.chunks_exact(16).map(|c| u128::from_be_bytes(le(c))).collect();
                values.push((field.name, Value::U128Array(items)));
            }
            FieldKind::Flags(layout) => {
                let bits = decode_flags(chunk, layout);
                if layout.padding_const && bits.padding() != 0 {
                    return Err(Error::SchemaConstantMismatch {
                        schema: schema.name,
                        field:  field.name,
                        offset,
                    });
                }
                values.push((field.name, Value::Flags(bits)));
            }
            FieldKind::Padding(_) => {}
            FieldKind::Const(expected) => {
                if chunk != expected {
                    return Err(Error::SchemaConstantMismatch {
                        schema: schema.name,
                        field:  field.name,
                        offset,
                    });
                }
            }
        }
        offset += width;
    }

    Ok(Record { schema, values })
}

/// Read the block as a little-endian integer: byte `i` supplies bits `8i..8i+8`.
fn decode_flags(chunk: &[u8], layout: FlagLayout) -> FlagBits {
    let raw = chunk
        .iter()
        .take(8)
        .enumerate()
        .fold(0u64, |acc, (i, byte)| acc | (u64::from(*byte) << (8 * i)));
    FlagBits { layout, raw }
}

/// Slice-to-array for chunks whose width the schema already guarantees.
fn le<const N: usize>(chunk: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&chunk[..N]);
    out
}

// ─── Encode ───────────────────────────────────────────────────────────────────

/// Serialize a record back into exactly `schema.span()` bytes.
pub fn encode(record: &Record) -> Result<Vec<u8>> {
    let schema = record.schema;
    let mut out = Vec::with_capacity(schema.span());
    for field in schema.fields {
        match field.kind {
            FieldKind::Padding(n) => out.extend(std::iter::repeat(0u8).take(n)),
            FieldKind::Const(bytes) => out.extend_from_slice(bytes),
            kind => {
                let value = record.get(field.name).ok_or_else(|| Error::FieldMissing {
                    schema: schema.name,
                    field:  field.name.to_string(),
                })?;
                if !value_fits(&kind, value) {
                    return Err(record.type_error(field.name, kind_label(&kind)));
                }
                encode_value(&kind, value, &mut out);
            }
        }
    }
    Ok(out)
}

fn encode_value(kind: &FieldKind, value: &Value, out: &mut Vec<u8>) {
    match (kind, value) {
        (_, Value::U8(v)) => out.push(*v),
        (_, Value::U32(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (_, Value::U64(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (FieldKind::U128Be, Value::U128(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (_, Value::U128(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (_, Value::Pubkey(v)) => out.extend_from_slice(v.as_ref()),
        (_, Value::Bytes(v)) => out.extend_from_slice(v),
        (_, Value::U64Array(v)) => v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
        (_, Value::U128Array(v)) => v.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        (_, Value::Flags(bits)) => {
            out.extend_from_slice(&bits.raw.to_le_bytes()[..bits.layout.width.min(8)]);
            out.extend(std::iter::repeat(0u8).take(bits.layout.width.saturating_sub(8)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        ProtocolVariant, AMM_INFO_V4, MARKET_STATE_V2, OPEN_ORDERS, SERUM_ACCOUNT_FLAGS,
        TOKEN_ACCOUNT,
    };

    static MAGIC: Schema = Schema {
        name: "magic",
        fields: &[
            Field { name: "magic", kind: FieldKind::Const(b"serum") },
            Field { name: "value", kind: FieldKind::U32 },
        ],
    };

    const LOOSE_FLAGS: FlagLayout = FlagLayout {
        width: 8,
        names: &["a", "b", "c"],
        padding_const: false,
    };

    static LOOSE: Schema = Schema {
        name: "loose",
        fields: &[Field { name: "flags", kind: FieldKind::Flags(LOOSE_FLAGS) }],
    };

    fn sample_pool() -> Record {
        Record::zeroed(&AMM_INFO_V4)
            .with("status", Value::U64(6)).unwrap()
            .with("coinDecimals", Value::U64(9)).unwrap()
            .with("swapFeeNumerator", Value::U64(25)).unwrap()
            .with("swapFeeDenominator", Value::U64(10_000)).unwrap()
            .with("swapCoinInAmount", Value::U128(u128::MAX - 7)).unwrap()
            .with("swapPcOutAmount", Value::U128(1 << 100)).unwrap()
            .with("coinMintAddress", Value::Pubkey(Pubkey::new_unique())).unwrap()
            .with("pnlOwner", Value::Pubkey(Pubkey::new_unique())).unwrap()
    }

    #[test]
    fn test_round_trip_pool() {
        let record = sample_pool();
        let bytes = encode(&record).unwrap();
        assert_eq!(bytes.len(), 752);
        assert_eq!(decode(&bytes, &AMM_INFO_V4).unwrap(), record);
    }

    #[test]
    fn test_round_trip_open_orders_arrays() {
        let mut orders = vec![0u128; 128];
        orders[0] = 0x0102_0304_0506_0708_090a_0b0c_0d0e_0f10;
        orders[127] = u128::MAX;
        let mut client_ids = vec![0u64; 128];
        client_ids[5] = 42;
        let record = Record::zeroed(&OPEN_ORDERS)
            .with("accountFlags", Value::Flags(FlagBits::from_names(
                SERUM_ACCOUNT_FLAGS,
                &["initialized", "open_orders"],
            ))).unwrap()
            .with("baseTokenTotal", Value::U64(50)).unwrap()
            .with("freeSlotBits", Value::Bytes(vec![0xff; 16])).unwrap()
            .with("orders", Value::U128Array(orders)).unwrap()
            .with("clientIds", Value::U64Array(client_ids)).unwrap();

        let bytes = encode(&record).unwrap();
        assert_eq!(bytes.len(), 3228);
        // Order ids are stored big-endian: the first byte of the slot is the high byte.
        let orders_at = OPEN_ORDERS.offset_of("orders").unwrap();
        assert_eq!(bytes[orders_at], 0x01);
        assert_eq!(bytes[orders_at + 15], 0x10);

        let decoded = decode(&bytes, &OPEN_ORDERS).unwrap();
        assert_eq!(decoded, record);
        let flags = decoded.flags("accountFlags").unwrap();
        assert!(flags.get("initialized") && flags.get("open_orders"));
        assert!(!flags.get("market"));
    }

    #[test]
    fn test_round_trip_every_variant() {
        for variant in ProtocolVariant::ALL {
            let schema = variant.schema();
            let mut record = Record::zeroed(schema);
            for field in schema.fields {
                let value = match field.kind {
                    FieldKind::U8 => Value::U8(0xab),
                    FieldKind::U32 => Value::U32(0xdead_beef),
                    FieldKind::U64 => Value::U64(u64::MAX - 1),
                    FieldKind::Pubkey => Value::Pubkey(Pubkey::new_unique()),
                    FieldKind::Bytes(n) => Value::Bytes((0..n as u8).collect()),
                    _ => continue,
                };
                record.set(field.name, value).unwrap();
            }
            let bytes = encode(&record).unwrap();
            assert_eq!(bytes.len(), schema.span(), "{}", schema.name);
            assert_eq!(decode(&bytes, schema).unwrap(), record, "{}", schema.name);
        }
    }

    #[test]
    fn test_truncated_by_one_byte() {
        for schema in [&AMM_INFO_V4, &MARKET_STATE_V2, &OPEN_ORDERS, &TOKEN_ACCOUNT] {
            let short = vec![0u8; schema.span() - 1];
            match decode(&short, schema) {
                Err(Error::DecodeTruncated { expected, actual, .. }) => {
                    assert_eq!(expected, schema.span());
                    assert_eq!(actual, schema.span() - 1);
                }
                other => panic!("{}: expected truncation, got {other:?}", schema.name),
            }
        }
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut bytes = encode(&Record::zeroed(&TOKEN_ACCOUNT)).unwrap();
        bytes.extend_from_slice(&[9, 9, 9]);
        assert!(decode(&bytes, &TOKEN_ACCOUNT).is_ok());
    }

    #[test]
    fn test_flags_are_little_endian_low_bit_first() {
        let mut bytes = vec![0u8; 388];
        bytes[5] = 0b0000_0011; // initialized + market
        let record = decode(&bytes, &MARKET_STATE_V2).unwrap();
        let flags = record.flags("accountFlags").unwrap();
        assert!(flags.get("initialized"));
        assert!(flags.get("market"));
        assert!(!flags.get("asks"));
    }

    #[test]
    fn test_every_serum_flag_combination_round_trips() {
        for raw in 0u64..128 {
            let bits = FlagBits { layout: SERUM_ACCOUNT_FLAGS, raw };
            let record = Record::zeroed(&MARKET_STATE_V2)
                .with("accountFlags", Value::Flags(bits))
                .unwrap();
            let bytes = encode(&record).unwrap();
            assert_eq!(bytes[5..13], raw.to_le_bytes());

            let decoded = decode(&bytes, &MARKET_STATE_V2).unwrap();
            let flags = decoded.flags("accountFlags").unwrap();
            assert_eq!(flags, bits, "raw {raw:#09b}");
            for (bit, name) in SERUM_ACCOUNT_FLAGS.names.iter().enumerate() {
                assert_eq!(flags.get(name), raw & (1 << bit) != 0, "{name} in {raw:#09b}");
            }
        }
    }

    #[test]
    fn test_constant_padding_bit_rejected() {
        let mut bytes = vec![0u8; 388];
        bytes[5] = 0b1000_0001; // bit 7 is the first padding bit
        match decode(&bytes, &MARKET_STATE_V2) {
            Err(Error::SchemaConstantMismatch { field, offset, .. }) => {
                assert_eq!(field, "accountFlags");
                assert_eq!(offset, 5);
            }
            other => panic!("expected constant mismatch, got {other:?}"),
        }

        let mut bytes = vec![0u8; 388];
        bytes[12] = 0x80; // highest padding bit
        assert!(matches!(
            decode(&bytes, &MARKET_STATE_V2),
            Err(Error::SchemaConstantMismatch { .. })
        ));
    }

    #[test]
    fn test_loose_padding_preserved() {
        let bytes = [0b0000_0101u8, 0, 0, 0, 0, 0, 0, 0x40];
        let record = decode(&bytes, &LOOSE).unwrap();
        let flags = record.flags("flags").unwrap();
        assert!(flags.get("a") && !flags.get("b") && flags.get("c"));
        assert_eq!(flags.padding(), 0x40 << 56);
        assert_eq!(encode(&record).unwrap(), bytes.to_vec());
    }

    #[test]
    fn test_const_field() {
        let mut ok = b"serum".to_vec();
        ok.extend_from_slice(&7u32.to_le_bytes());
        assert_eq!(decode(&ok, &MAGIC).unwrap().u32("value").unwrap(), 7);

        let mut bad = b"serun".to_vec();
        bad.extend_from_slice(&7u32.to_le_bytes());
        assert!(matches!(
            decode(&bad, &MAGIC),
            Err(Error::SchemaConstantMismatch { field: "magic", offset: 0, .. })
        ));
    }

    #[test]
    fn test_accessor_errors() {
        let record = Record::zeroed(&TOKEN_ACCOUNT);
        assert!(matches!(record.u64("missing"), Err(Error::FieldMissing { .. })));
        assert!(matches!(record.pubkey("amount"), Err(Error::FieldType { .. })));
        let mut record = record;
        assert!(record.set("amount", Value::U32(1)).is_err());
    }
}
