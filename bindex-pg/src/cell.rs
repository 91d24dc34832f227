//! Column value rendering.
//!
//! Rows arrive in binary format; each supported column type is decoded and
//! rendered as the text PostgreSQL itself would print.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use postgres_types::{FromSql, Kind, Type};
use std::error::Error;

type BoxError = Box<dyn Error + Sync + Send>;

/// The text form of one non-NULL column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellText(pub String);

impl CellText {
    pub fn into_string(self) -> String {
        self.0
    }
}

impl<'a> FromSql<'a> for CellText {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        render(ty, raw).map(CellText)
    }

    fn accepts(ty: &Type) -> bool {
        is_textual(ty)
            || matches!(ty.kind(), Kind::Enum(_))
            || matches!(
                *ty,
                Type::BOOL
                    | Type::CHAR
                    | Type::INT2
                    | Type::INT4
                    | Type::INT8
                    | Type::OID
                    | Type::FLOAT4
                    | Type::FLOAT8
                    | Type::NUMERIC
                    | Type::DATE
                    | Type::TIME
                    | Type::TIMESTAMP
                    | Type::TIMESTAMPTZ
                    | Type::UUID
                    | Type::JSON
                    | Type::JSONB
                    | Type::BYTEA
            )
    }
}

fn is_textual(ty: &Type) -> bool {
    <&str as FromSql>::accepts(ty)
}

/// Render a binary column value as text.
pub fn render(ty: &Type, raw: &[u8]) -> Result<String, BoxError> {
    if is_textual(ty) || matches!(ty.kind(), Kind::Enum(_)) {
        return Ok(String::from_sql(ty, raw)?);
    }

    let text = match *ty {
        Type::BOOL => String::from(if bool::from_sql(ty, raw)? { "t" } else { "f" }),
        Type::CHAR => ((i8::from_sql(ty, raw)? as u8) as char).to_string(),
        Type::INT2 => i16::from_sql(ty, raw)?.to_string(),
        Type::INT4 => i32::from_sql(ty, raw)?.to_string(),
        Type::INT8 => i64::from_sql(ty, raw)?.to_string(),
        Type::OID => u32::from_sql(ty, raw)?.to_string(),
        Type::FLOAT4 => float_text(f32::from_sql(ty, raw)?, FLOAT4_FIXED_DIGITS),
        Type::FLOAT8 => float_text(f64::from_sql(ty, raw)?, FLOAT8_FIXED_DIGITS),
        Type::NUMERIC => numeric_text(raw)?,
        Type::DATE => NaiveDate::from_sql(ty, raw)?.format("%Y-%m-%d").to_string(),
        Type::TIME => {
            let time = NaiveTime::from_sql(ty, raw)?;
            with_fraction(time.format("%H:%M:%S").to_string(), time.nanosecond())
        }
        Type::TIMESTAMP => {
            let ts = NaiveDateTime::from_sql(ty, raw)?;
            with_fraction(ts.format("%Y-%m-%d %H:%M:%S").to_string(), ts.nanosecond())
        }
        // The session time zone is pinned to UTC, so the offset is always +00.
        Type::TIMESTAMPTZ => {
            let ts = DateTime::<Utc>::from_sql(ty, raw)?;
            let mut text = with_fraction(ts.format("%Y-%m-%d %H:%M:%S").to_string(), ts.nanosecond());
            text.push_str("+00");
            text
        }
        Type::UUID => uuid::Uuid::from_sql(ty, raw)?.to_string(),
        Type::JSON | Type::JSONB => serde_json::Value::from_sql(ty, raw)?.to_string(),
        Type::BYTEA => format!("\\x{}", hex::encode(raw)),
        _ => return Err(format!("unsupported column type {}", ty.name()).into()),
    };
    Ok(text)
}

/// Decimal exponents at or above this print in exponent form.
const FLOAT4_FIXED_DIGITS: i32 = 6;
const FLOAT8_FIXED_DIGITS: i32 = 15;

/// Shortest round-trip digits, in fixed notation for exponents in
/// `-4..fixed_digits` and as `1.5e+20` / `1e-05` otherwise.
fn float_text<F>(value: F, fixed_digits: i32) -> String
where
    F: std::fmt::Display + std::fmt::LowerExp + Into<f64> + Copy,
{
    let wide: f64 = value.into();
    if wide.is_nan() {
        return "NaN".to_string();
    }
    if wide.is_infinite() {
        let text = if wide > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }

    let scientific = format!("{:e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if wide == 0.0 || (-4..fixed_digits).contains(&exponent) {
        value.to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

/// Append the microsecond fraction without trailing zeros, if any.
fn with_fraction(mut text: String, nanos: u32) -> String {
    let micros = (nanos / 1_000) % 1_000_000;
    if micros > 0 {
        let digits = format!("{:06}", micros);
        text.push('.');
        text.push_str(digits.trim_end_matches('0'));
    }
    text
}

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Decode the binary `numeric` format: a header of digit count, weight,
/// sign and display scale, followed by base-10000 digits.
pub fn numeric_text(raw: &[u8]) -> Result<String, BoxError> {
    if raw.len() < 8 {
        return Err("numeric value shorter than its header".into());
    }
    let word = |i: usize| u16::from_be_bytes([raw[i], raw[i + 1]]);

    let ndigits = word(0) as usize;
    let weight = i32::from(word(2) as i16);
    let sign = word(4);
    let dscale = word(6) as usize;

    if raw.len() != 8 + ndigits * 2 {
        return Err(format!("numeric value declares {} digits but carries {} bytes", ndigits, raw.len() - 8).into());
    }

    match sign {
        NUMERIC_NAN => return Ok("NaN".to_string()),
        NUMERIC_PINF => return Ok("Infinity".to_string()),
        NUMERIC_NINF => return Ok("-Infinity".to_string()),
        NUMERIC_POS | NUMERIC_NEG => {}
        other => return Err(format!("invalid numeric sign 0x{:04X}", other).into()),
    }

    let digits: Vec<u16> = (0..ndigits).map(|i| word(8 + 2 * i)).collect();
    let digit_at = |pos: i32| -> u16 {
        usize::try_from(pos)
            .ok()
            .and_then(|p| digits.get(p).copied())
            .unwrap_or(0)
    };

    let mut out = String::new();
    if sign == NUMERIC_NEG {
        out.push('-');
    }

    if weight < 0 {
        out.push('0');
    } else {
        out.push_str(&digit_at(0).to_string());
        for pos in 1..=weight {
            out.push_str(&format!("{:04}", digit_at(pos)));
        }
    }

    if dscale > 0 {
        let mut fraction = String::with_capacity(dscale + 4);
        let mut pos = weight + 1;
        while fraction.len() < dscale {
            fraction.push_str(&format!("{:04}", digit_at(pos)));
            pos += 1;
        }
        fraction.truncate(dscale);
        out.push('.');
        out.push_str(&fraction);
    }

    Ok(out)
}
