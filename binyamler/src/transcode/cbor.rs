//! CBOR output: convert document values to CBOR binary data.
//!
//! Mapping:
//!   - Value::Null    -> CBOR null (simple value 22)
//!   - Value::Bool    -> CBOR bool (simple values 20/21)
//!   - Value::Number  -> CBOR integer (smallest encoding that fits), or
//!                       float64 (always 9 bytes, never downgraded)
//!   - Value::String  -> CBOR text string (determinate length)
//!   - Value::List    -> CBOR array (determinate length)
//!   - Value::Map     -> CBOR map (determinate length, keys of any kind,
//!                       in document order)

use anyhow::Result;
use libyamler::{Number, Value};

/// Encode a value as CBOR bytes.
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_value(&mut buf, value);
    Ok(buf)
}

fn write_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => buf.push(0xf6),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Number(Number::Int(n)) => write_integer(buf, i64::from(*n)),
        Value::Number(Number::Long(n)) => write_integer(buf, *n),
        Value::Number(Number::Float(f)) => {
            buf.push(0xfb);
            buf.extend_from_slice(&f.to_be_bytes());
        }
        Value::String(s) => {
            let bytes = s.as_bytes();
            write_type_and_length(buf, 3, bytes.len() as u64);
            buf.extend_from_slice(bytes);
        }
        Value::List(items) => {
            write_type_and_length(buf, 4, items.len() as u64);
            for item in items.iter() {
                write_value(buf, item);
            }
        }
        Value::Map(map) => {
            write_type_and_length(buf, 5, map.len() as u64);
            for (k, v) in map.iter() {
                write_value(buf, k);
                write_value(buf, v);
            }
        }
    }
}

fn write_type_and_length(buf: &mut Vec<u8>, major: u8, val: u64) {
    let high = major << 5;
    match val {
        0..=23 => buf.push(high | val as u8),
        24..=0xff => {
            buf.push(high | 24);
            buf.push(val as u8);
        }
        0x100..=0xffff => {
            buf.push(high | 25);
            buf.extend_from_slice(&(val as u16).to_be_bytes());
        }
        0x10000..=0xffff_ffff => {
            buf.push(high | 26);
            buf.extend_from_slice(&(val as u32).to_be_bytes());
        }
        _ => {
            buf.push(high | 27);
            buf.extend_from_slice(&val.to_be_bytes());
        }
    }
}

fn write_integer(buf: &mut Vec<u8>, n: i64) {
    if n < 0 {
        // major 1 stores -1 - n
        write_type_and_length(buf, 1, !(n as u64));
    } else {
        write_type_and_length(buf, 0, n as u64);
    }
}
