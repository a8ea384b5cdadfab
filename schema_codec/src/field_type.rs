//! The field type namespace (spec.md §3): canonical string tags for every
//! codec branch, plus the two well-known value types (`Instant`, `Decimal`)
//! that aren't primitives but aren't nested records either.

use chrono::{DateTime, TimeZone, Utc};
use num_bigint::BigInt;

pub const BOOL: &str = "bool";
pub const I8: &str = "i8";
pub const I16: &str = "i16";
pub const I32: &str = "i32";
pub const I64: &str = "i64";
pub const F32: &str = "f32";
pub const F64: &str = "f64";
pub const STR: &str = "str";
pub const INSTANT: &str = "instant";
pub const DECIMAL: &str = "decimal";

pub fn boxed(scalar: &str) -> String {
    format!("box:{}", scalar)
}

pub fn array(scalar: &str) -> String {
    format!("arr:{}", scalar)
}

/// Millisecond-precision instant, independent of any particular clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instant {
    millis_since_epoch: i64,
}

impl Instant {
    pub fn from_millis(millis_since_epoch: i64) -> Self {
        Instant { millis_since_epoch }
    }

    pub fn millis(&self) -> i64 {
        self.millis_since_epoch
    }

    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Instant { millis_since_epoch: dt.timestamp_millis() }
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.millis_since_epoch)
            .single()
            .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap())
    }
}

impl Default for Instant {
    fn default() -> Self {
        Instant::from_millis(0)
    }
}

/// Arbitrary-precision decimal: an unscaled integer magnitude plus a base-10
/// scale, exactly the representation the source system's `BigDecimal`
/// serialization uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    pub unscaled: BigInt,
    pub scale: i32,
}

impl Decimal {
    pub fn new(unscaled: BigInt, scale: i32) -> Self {
        Decimal { unscaled, scale }
    }

    pub fn to_signed_bytes_be(&self) -> Vec<u8> {
        self.unscaled.to_signed_bytes_be()
    }

    pub fn from_signed_bytes_be(bytes: &[u8], scale: i32) -> Self {
        Decimal { unscaled: BigInt::from_signed_bytes_be(bytes), scale }
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Decimal { unscaled: BigInt::from(0), scale: 0 }
    }
}
