//! Primitive values carried by payload elements.

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::fmt;
use uuid::Uuid;

/// A primitive value from the EDM type system.
#[derive(Clone, Debug)]
pub enum ODataValue {
    Null,
    Boolean(bool),
    Byte(u8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Single(f32),
    Double(f64),
    Decimal(BigDecimal),
    Guid(Uuid),
    DateTimeOffset(DateTime<Utc>),
    Date(NaiveDate),
    TimeOfDay(NaiveTime),
    String(String),
    Binary(Vec<u8>),
}

impl ODataValue {
    /// Full EDM type name of the value, `None` for null.
    #[must_use]
    pub fn edm_type_name(&self) -> Option<&'static str> {
        let name = match self {
            ODataValue::Null => return None,
            ODataValue::Boolean(_) => "Edm.Boolean",
            ODataValue::Byte(_) => "Edm.Byte",
            ODataValue::Int16(_) => "Edm.Int16",
            ODataValue::Int32(_) => "Edm.Int32",
            ODataValue::Int64(_) => "Edm.Int64",
            ODataValue::Single(_) => "Edm.Single",
            ODataValue::Double(_) => "Edm.Double",
            ODataValue::Decimal(_) => "Edm.Decimal",
            ODataValue::Guid(_) => "Edm.Guid",
            ODataValue::DateTimeOffset(_) => "Edm.DateTimeOffset",
            ODataValue::Date(_) => "Edm.Date",
            ODataValue::TimeOfDay(_) => "Edm.TimeOfDay",
            ODataValue::String(_) => "Edm.String",
            ODataValue::Binary(_) => "Edm.Binary",
        };
        Some(name)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, ODataValue::Null)
    }
}

// Floats compare by bit pattern so that NaN fixtures survive a deep copy comparison.
impl PartialEq for ODataValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ODataValue::Null, ODataValue::Null) => true,
            (ODataValue::Boolean(a), ODataValue::Boolean(b)) => a == b,
            (ODataValue::Byte(a), ODataValue::Byte(b)) => a == b,
            (ODataValue::Int16(a), ODataValue::Int16(b)) => a == b,
            (ODataValue::Int32(a), ODataValue::Int32(b)) => a == b,
            (ODataValue::Int64(a), ODataValue::Int64(b)) => a == b,
            (ODataValue::Single(a), ODataValue::Single(b)) => a.to_bits() == b.to_bits(),
            (ODataValue::Double(a), ODataValue::Double(b)) => a.to_bits() == b.to_bits(),
            (ODataValue::Decimal(a), ODataValue::Decimal(b)) => a == b,
            (ODataValue::Guid(a), ODataValue::Guid(b)) => a == b,
            (ODataValue::DateTimeOffset(a), ODataValue::DateTimeOffset(b)) => a == b,
            (ODataValue::Date(a), ODataValue::Date(b)) => a == b,
            (ODataValue::TimeOfDay(a), ODataValue::TimeOfDay(b)) => a == b,
            (ODataValue::String(a), ODataValue::String(b)) => a == b,
            (ODataValue::Binary(a), ODataValue::Binary(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ODataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ODataValue::Null => write!(f, "null"),
            ODataValue::Boolean(v) => write!(f, "{v}"),
            ODataValue::Byte(v) => write!(f, "{v}"),
            ODataValue::Int16(v) => write!(f, "{v}"),
            ODataValue::Int32(v) => write!(f, "{v}"),
            ODataValue::Int64(v) => write!(f, "{v}L"),
            ODataValue::Single(v) => write!(f, "{v}f"),
            ODataValue::Double(v) => write!(f, "{v}d"),
            ODataValue::Decimal(v) => write!(f, "{v}m"),
            ODataValue::Guid(v) => write!(f, "guid'{v}'"),
            ODataValue::DateTimeOffset(v) => write!(f, "datetimeoffset'{}'", v.to_rfc3339()),
            ODataValue::Date(v) => write!(f, "date'{v}'"),
            ODataValue::TimeOfDay(v) => write!(f, "time'{v}'"),
            ODataValue::String(v) => write!(f, "'{v}'"),
            ODataValue::Binary(v) => write!(f, "binary({} bytes)", v.len()),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ODataValue {
                fn from(v: $ty) -> Self {
                    ODataValue::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Boolean,
    u8 => Byte,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Single,
    f64 => Double,
    BigDecimal => Decimal,
    Uuid => Guid,
    DateTime<Utc> => DateTimeOffset,
    NaiveDate => Date,
    NaiveTime => TimeOfDay,
    String => String,
    Vec<u8> => Binary,
}

impl From<&str> for ODataValue {
    fn from(v: &str) -> Self {
        ODataValue::String(v.to_owned())
    }
}
