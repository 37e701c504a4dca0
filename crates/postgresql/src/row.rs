//! Row decoding: `tokio_postgres::Row` → `Vec<dump_core::Value>`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use dump_core::{DumpError, Result, Value};
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::Write;
use tokio_postgres::types::{FromSql, Type};
use tokio_postgres::Row;

/// Decode every column of a row, in column order
pub fn decode_row(row: &Row) -> Result<Vec<Value>> {
    (0..row.len())
        .map(|index| decode_value(row, index))
        .collect()
}

fn decode_value(row: &Row, index: usize) -> Result<Value> {
    let column = &row.columns()[index];
    let pg_type = column.type_();

    let value = match *pg_type {
        Type::BOOL => get::<bool>(row, index)?.map(Value::Bool),
        Type::INT2 => get::<i16>(row, index)?.map(|i| Value::Int(i as i64)),
        Type::INT4 => get::<i32>(row, index)?.map(|i| Value::Int(i as i64)),
        Type::INT8 => get::<i64>(row, index)?.map(Value::Int),
        Type::OID => get::<u32>(row, index)?.map(|i| Value::Int(i as i64)),
        Type::FLOAT4 => get::<f32>(row, index)?.map(|f| Value::Float(f as f64)),
        Type::FLOAT8 => get::<f64>(row, index)?.map(Value::Float),
        Type::NUMERIC => {
            // rust_decimal rejects NaN, infinities and values beyond 28 digits
            match row.try_get::<_, Option<Decimal>>(index) {
                Ok(decimal) => decimal.map(Value::Decimal),
                Err(_) => get::<NumericText>(row, index)?.map(NumericText::into_value),
            }
        }
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            get::<String>(row, index)?.map(Value::Text)
        }
        Type::CHAR => get::<i8>(row, index)?.map(char_value),
        Type::DATE => get::<PgDate>(row, index)?.map(|date| date.0),
        Type::TIME => get::<NaiveTime>(row, index)?.map(Value::Time),
        Type::TIMESTAMP => get::<PgTimestamp>(row, index)?.map(|ts| ts.0),
        _ => get::<RawBytes>(row, index)?.map(|raw| raw.into_value(pg_type)),
    };

    Ok(value.unwrap_or(Value::Null))
}

fn get<'a, T: FromSql<'a>>(row: &'a Row, index: usize) -> Result<Option<T>> {
    row.try_get::<_, Option<T>>(index).map_err(|e| {
        DumpError::database(
            format!("decoding column '{}'", row.columns()[index].name()),
            e,
        )
    })
}

/// The single-byte `"char"` type.
/// Bytes above 0x7F are not characters of a UTF-8 session; they are written in the
/// `\ooo` octal form the type accepts as input.
fn char_value(c: i8) -> Value {
    let byte = c as u8;
    if byte.is_ascii() {
        Value::Text((byte as char).to_string())
    } else {
        Value::Other(format!("\\{byte:03o}"))
    }
}

/// `infinity` / `-infinity` are stored as the extreme values of the wire integer
fn infinity_label(is_max: bool, is_min: bool) -> Option<Value> {
    if is_max {
        Some(Value::Other("infinity".to_string()))
    } else if is_min {
        Some(Value::Other("-infinity".to_string()))
    } else {
        None
    }
}

/// DATE, including the infinite dates chrono cannot represent
struct PgDate(Value);

impl<'a> FromSql<'a> for PgDate {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> std::result::Result<Self, Box<dyn Error + Sync + Send>> {
        if let Ok(bytes) = <[u8; 4]>::try_from(raw) {
            let days = i32::from_be_bytes(bytes);
            if let Some(value) = infinity_label(days == i32::MAX, days == i32::MIN) {
                return Ok(PgDate(value));
            }
        }
        NaiveDate::from_sql(ty, raw).map(|date| PgDate(Value::Date(date)))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::DATE
    }
}

/// TIMESTAMP, including the infinite timestamps chrono cannot represent
struct PgTimestamp(Value);

impl<'a> FromSql<'a> for PgTimestamp {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> std::result::Result<Self, Box<dyn Error + Sync + Send>> {
        if let Ok(bytes) = <[u8; 8]>::try_from(raw) {
            let micros = i64::from_be_bytes(bytes);
            if let Some(value) = infinity_label(micros == i64::MAX, micros == i64::MIN) {
                return Ok(PgTimestamp(value));
            }
        }
        NaiveDateTime::from_sql(ty, raw).map(|ts| PgTimestamp(Value::Timestamp(ts)))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::TIMESTAMP
    }
}

/// Undecoded binary wire value; accepts every type
struct RawBytes(Vec<u8>);

impl RawBytes {
    fn into_value(self, ty: &Type) -> Value {
        match ty.kind() {
            // enum labels and citext are sent as their UTF-8 text
            tokio_postgres::types::Kind::Enum(_) => {
                Value::Text(String::from_utf8_lossy(&self.0).into_owned())
            }
            _ if ty.name() == "citext" => {
                Value::Text(String::from_utf8_lossy(&self.0).into_owned())
            }
            _ => Value::Bytes(self.0),
        }
    }
}

impl<'a> FromSql<'a> for RawBytes {
    fn from_sql(_: &Type, raw: &'a [u8]) -> std::result::Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(RawBytes(raw.to_vec()))
    }

    fn accepts(_: &Type) -> bool {
        true
    }
}

/// NUMERIC decoded to its exact decimal text
struct NumericText(String);

impl NumericText {
    fn into_value(self) -> Value {
        match self.0.as_str() {
            "NaN" => Value::Float(f64::NAN),
            "Infinity" => Value::Float(f64::INFINITY),
            "-Infinity" => Value::Float(f64::NEG_INFINITY),
            _ => Value::Other(self.0),
        }
    }
}

impl<'a> FromSql<'a> for NumericText {
    fn from_sql(_: &Type, raw: &'a [u8]) -> std::result::Result<Self, Box<dyn Error + Sync + Send>> {
        numeric_to_string(raw).map(NumericText)
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Render the binary NUMERIC wire format (base-10000 digit groups) as decimal text
fn numeric_to_string(raw: &[u8]) -> std::result::Result<String, Box<dyn Error + Sync + Send>> {
    if raw.len() < 8 {
        return Err("invalid NUMERIC header".into());
    }
    let read_u16 = |at: usize| u16::from_be_bytes([raw[at], raw[at + 1]]);

    let ndigits = read_u16(0) as usize;
    let weight = read_u16(2) as i16 as i32;
    let sign = read_u16(4);
    let dscale = read_u16(6) as usize;

    match sign {
        NUMERIC_NAN => return Ok("NaN".to_string()),
        NUMERIC_PINF => return Ok("Infinity".to_string()),
        NUMERIC_NINF => return Ok("-Infinity".to_string()),
        NUMERIC_POS | NUMERIC_NEG => {}
        other => return Err(format!("invalid NUMERIC sign 0x{other:04x}").into()),
    }
    if raw.len() < 8 + ndigits * 2 {
        return Err("truncated NUMERIC digits".into());
    }
    let digits: Vec<u16> = (0..ndigits).map(|i| read_u16(8 + i * 2)).collect();
    let digit_at = |position: i32| -> u16 {
        if position < 0 {
            0
        } else {
            digits.get(position as usize).copied().unwrap_or(0)
        }
    };

    let mut out = String::new();
    if sign == NUMERIC_NEG {
        out.push('-');
    }

    if weight < 0 {
        out.push('0');
    } else {
        for position in 0..=weight {
            let group = digit_at(position);
            if position == 0 {
                write!(out, "{group}")?;
            } else {
                write!(out, "{group:04}")?;
            }
        }
    }

    if dscale > 0 {
        let mut fraction = String::new();
        let mut position = weight + 1;
        while fraction.len() < dscale {
            write!(fraction, "{:04}", digit_at(position))?;
            position += 1;
        }
        fraction.truncate(dscale);
        out.push('.');
        out.push_str(&fraction);
    }

    Ok(out)
}
