//! Arbitrary-precision `numeric` as exact decimal text.
//!
//! Binary layout (all fields big-endian):
//! - ndigits (i16): number of base-10000 digit groups that follow
//! - weight (i16): power of 10000 of the first group
//! - sign (u16): 0x0000 positive, 0x4000 negative, 0xC000 NaN,
//!   0xD000 +Infinity, 0xF000 -Infinity
//! - dscale (u16): digits shown after the decimal point
//! - ndigits × i16 groups, each 0..=9999
//!
//! Groups carry no leading or trailing zero groups, so the decimal point
//! position comes from `weight` and the displayed scale from `dscale` alone.

use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Cell, FromPg, PgType, ToPg, binary_payload};
use crate::error::{TypeError, TypeResult};

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;
const NUMERIC_DSCALE_MASK: u16 = 0x3FFF;

const NBASE: u16 = 10000;
const DEC_DIGITS: usize = 4;
const HEADER_LEN: usize = 8;

/// Largest representable weight (i16) in decimal digits before the point.
const MAX_INT_DIGITS: usize = (i16::MAX as usize + 1) * DEC_DIGITS;

/// ndigits is an i16 on the wire.
const MAX_GROUPS: usize = i16::MAX as usize;

/// Exact decimal value of a `numeric` cell.
///
/// Always one of `NaN`, `Infinity`, `-Infinity`, or `-?digits(.digits)?` with
/// no redundant leading zeros. The fraction is kept as written so `7.0` and
/// `7` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Numeric(String);

impl Numeric {
    pub fn nan() -> Self {
        Numeric("NaN".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_nan(&self) -> bool {
        self.0 == "NaN"
    }

    pub fn is_infinite(&self) -> bool {
        self.0 == "Infinity" || self.0 == "-Infinity"
    }

    /// Digits after the decimal point.
    pub fn scale(&self) -> usize {
        match self.0.split_once('.') {
            Some((_, frac)) => frac.len(),
            None => 0,
        }
    }

    #[cfg(feature = "decimal")]
    pub fn to_decimal(&self) -> TypeResult<rust_decimal::Decimal> {
        match rust_decimal::Decimal::from_str_exact(&self.0) {
            Ok(value) => Ok(value),
            Err(err) => Err(TypeError::invalid_data(PgType::Numeric, "Decimal", err.to_string())),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Numeric {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Numeric> for String {
    fn from(value: Numeric) -> Self {
        value.0
    }
}

macro_rules! numeric_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Numeric {
                fn from(value: $ty) -> Self {
                    Numeric(value.to_string())
                }
            }
        )*
    };
}

numeric_from_int!(i16, i32, i64, u16, u32, u64);

impl FromStr for Numeric {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s) {
            Ok(text) => Ok(Numeric(text)),
            Err(reason) => Err(TypeError::invalid_data(
                PgType::Numeric,
                "Numeric",
                format!("{reason}: {s:?}"),
            )),
        }
    }
}

impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Canonical decimal text, or the reason `s` is not a decimal.
fn normalize(s: &str) -> Result<String, &'static str> {
    let trimmed = s.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "nan" => return Ok("NaN".to_string()),
        "infinity" | "+infinity" | "inf" | "+inf" => return Ok("Infinity".to_string()),
        "-infinity" | "-inf" => return Ok("-Infinity".to_string()),
        _ => {}
    }

    let (negative, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));

    if int_part.is_empty() && frac_part.is_empty() {
        return Err("no digits");
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return Err("not a decimal number");
    }
    if frac_part.len() > NUMERIC_DSCALE_MASK as usize {
        return Err("scale out of range");
    }

    let int_part = int_part.trim_start_matches('0');
    if int_part.len() > MAX_INT_DIGITS {
        return Err("value out of range");
    }
    if int_part.len().div_ceil(DEC_DIGITS) + frac_part.len().div_ceil(DEC_DIGITS) > MAX_GROUPS {
        return Err("too many digits");
    }

    let is_zero = int_part.is_empty() && frac_part.bytes().all(|b| b == b'0');
    let mut out = String::with_capacity(body.len() + 2);
    if negative && !is_zero {
        out.push('-');
    }
    out.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    Ok(out)
}

// ==================== Decode ====================


fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([data[at], data[at + 1]])
}

/// Append the four decimal digits of `group`, at most `take` of them.
fn push_group(out: &mut String, group: u16, take: usize) {
    let digits = [group / 1000, group / 100 % 10, group / 10 % 10, group % 10];
    for digit in digits.iter().take(take) {
        out.push(char::from(b'0' + *digit as u8));
    }
}

/// Decode a binary `numeric` payload into exact decimal text.
///
/// Pure; output length is bounded by the i16 weight and 14-bit dscale, so
/// untrusted payloads cannot request unbounded allocations.
pub fn decode_numeric(data: &[u8]) -> TypeResult<String> {
    decode_text(data, "String")
}

/// `decode_numeric`, with errors naming `expected` as the requested type.
pub(crate) fn decode_text(data: &[u8], expected: &'static str) -> TypeResult<String> {
    let malformed = |reason: String| TypeError::invalid_data(PgType::Numeric, expected, reason);

    if data.len() < HEADER_LEN {
        return Err(malformed(format!("header needs {HEADER_LEN} bytes, got {}", data.len())));
    }

    let ndigits = read_u16(data, 0) as i16;
    let weight = read_u16(data, 2) as i16;
    let sign = read_u16(data, 4);
    let raw_dscale = read_u16(data, 6);
    if raw_dscale & !NUMERIC_DSCALE_MASK != 0 {
        return Err(malformed(format!("invalid display scale {raw_dscale:#06x}")));
    }
    let dscale = raw_dscale as usize;

    if ndigits < 0 {
        return Err(malformed(format!("negative digit count {ndigits}")));
    }
    let expected_len = HEADER_LEN + ndigits as usize * 2;
    if data.len() != expected_len {
        return Err(malformed(format!(
            "{ndigits} digit groups need {expected_len} bytes, got {}",
            data.len()
        )));
    }

    match sign {
        NUMERIC_NAN => return Ok("NaN".to_string()),
        NUMERIC_PINF => return Ok("Infinity".to_string()),
        NUMERIC_NINF => return Ok("-Infinity".to_string()),
        NUMERIC_POS | NUMERIC_NEG => {}
        other => return Err(malformed(format!("unknown sign word {other:#06x}"))),
    }

    let mut digits = Vec::with_capacity(ndigits as usize);
    for i in 0..ndigits as usize {
        let group = read_u16(data, HEADER_LEN + i * 2);
        if group >= NBASE {
            return Err(malformed(format!("digit group {group} exceeds base {NBASE}")));
        }
        digits.push(group);
    }
    let group_at = |index: i32| -> u16 {
        if index < 0 {
            0
        } else {
            digits.get(index as usize).copied().unwrap_or(0)
        }
    };

    let int_groups = (weight as i32 + 1).max(0) as usize;
    let mut out = String::with_capacity(int_groups * DEC_DIGITS + dscale + 2);

    // Integer part: first non-zero group unpadded, the rest four digits each.
    let mut started = false;
    for index in 0..int_groups as i32 {
        let group = group_at(index);
        if started {
            push_group(&mut out, group, DEC_DIGITS);
        } else if group != 0 {
            out.push_str(&group.to_string());
            started = true;
        }
    }
    if !started {
        out.push('0');
    }

    // Fraction: exactly dscale digits, zero-filled past the stored groups.
    if dscale > 0 {
        out.push('.');
        let mut written = 0;
        let mut index = weight as i32 + 1;
        while written < dscale {
            let take = (dscale - written).min(DEC_DIGITS);
            push_group(&mut out, group_at(index), take);
            written += take;
            index += 1;
        }
    }

    // Negative zero has no text form of its own.
    if sign == NUMERIC_NEG && out.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        out.insert(0, '-');
    }
    Ok(out)
}

// ==================== Encode ====================

fn put_header(buf: &mut BytesMut, ndigits: i16, weight: i16, sign: u16, dscale: u16) {
    buf.put_i16(ndigits);
    buf.put_i16(weight);
    buf.put_u16(sign);
    buf.put_u16(dscale);
}

/// Encode canonical decimal text (see [`Numeric`]) as a binary payload.
pub fn encode_numeric(value: &Numeric, buf: &mut BytesMut) {
    write_decimal(value.as_str(), buf)
}

fn write_decimal(text: &str, buf: &mut BytesMut) {
    match text {
        "NaN" => return put_header(buf, 0, 0, NUMERIC_NAN, 0),
        "Infinity" => return put_header(buf, 0, 0, NUMERIC_PINF, 0),
        "-Infinity" => return put_header(buf, 0, 0, NUMERIC_NINF, 0),
        _ => {}
    }

    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    let int_part = int_part.trim_start_matches('0');
    let dscale = frac_part.len() as u16 & NUMERIC_DSCALE_MASK;

    // Align decimal digits on group boundaries around the point.
    let lead = (DEC_DIGITS - int_part.len() % DEC_DIGITS) % DEC_DIGITS;
    let mut decimal: Vec<u16> = vec![0; lead];
    decimal.extend(int_part.bytes().map(|b| (b - b'0') as u16));
    let int_groups = decimal.len() / DEC_DIGITS;
    decimal.extend(frac_part.bytes().map(|b| (b - b'0') as u16));
    let tail = (DEC_DIGITS - decimal.len() % DEC_DIGITS) % DEC_DIGITS;
    decimal.extend(std::iter::repeat_n(0, tail));

    let groups: Vec<u16> = decimal
        .chunks(DEC_DIGITS)
        .map(|c| c[0] * 1000 + c[1] * 100 + c[2] * 10 + c[3])
        .collect();

    let first = groups.iter().position(|&g| g != 0);
    let last = groups.iter().rposition(|&g| g != 0);
    let (first, last) = match (first, last) {
        (Some(first), Some(last)) => (first, last),
        // Zero: no groups, always positive.
        _ => return put_header(buf, 0, 0, NUMERIC_POS, dscale),
    };

    let kept = &groups[first..=last];
    let weight = int_groups as i32 - 1 - first as i32;
    let (Ok(ndigits), Ok(weight)) = (i16::try_from(kept.len()), i16::try_from(weight)) else {
        // Unreachable for parsed or decoded values, both bounded to i16 groups.
        tracing::error!(groups = kept.len(), weight, "numeric exceeds wire range, sending NaN");
        return put_header(buf, 0, 0, NUMERIC_NAN, 0);
    };
    let sign = if negative { NUMERIC_NEG } else { NUMERIC_POS };
    put_header(buf, ndigits, weight, sign, dscale);
    for &group in kept {
        buf.put_u16(group);
    }
}

impl<'a> FromPg<'a> for Numeric {
    fn from_pg(cell: &'a Cell) -> TypeResult<Self> {
        let data = binary_payload(cell, &[PgType::Numeric], "Numeric")?;
        decode_text(data, "Numeric").map(Numeric)
    }
}

impl ToPg for Numeric {
    const PG_TYPE: PgType = PgType::Numeric;

    fn write_binary(&self, buf: &mut BytesMut) {
        encode_numeric(self, buf)
    }
}

#[cfg(feature = "decimal")]
impl<'a> FromPg<'a> for rust_decimal::Decimal {
    fn from_pg(cell: &'a Cell) -> TypeResult<Self> {
        let data = binary_payload(cell, &[PgType::Numeric], "Decimal")?;
        Numeric(decode_text(data, "Decimal")?).to_decimal()
    }
}

#[cfg(feature = "decimal")]
impl ToPg for rust_decimal::Decimal {
    const PG_TYPE: PgType = PgType::Numeric;

    fn write_binary(&self, buf: &mut BytesMut) {
        // Display is plain `-?digits(.digits)?` with the value's scale.
        write_decimal(&self.to_string(), buf)
    }
}
