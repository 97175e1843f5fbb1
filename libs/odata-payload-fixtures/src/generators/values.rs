use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use odata_payload::{ODataValue, PrimitiveMultiValue, PrimitiveValue};
use tracing::debug;
use uuid::Uuid;

use crate::combinatorics::column_combinations;
use crate::settings::FixtureSettings;

fn samples() -> Vec<ODataValue> {
    let mut values = vec![
        ODataValue::Boolean(true),
        ODataValue::Boolean(false),
        ODataValue::Byte(0),
        ODataValue::Byte(u8::MAX),
        ODataValue::Int16(i16::MIN),
        ODataValue::Int32(0),
        ODataValue::Int32(i32::MAX),
        ODataValue::Int64(i64::MIN),
        ODataValue::Int64(9_007_199_254_740_993),
        ODataValue::Single(1.5),
        ODataValue::Double(-0.25),
        ODataValue::Double(f64::INFINITY),
        ODataValue::Guid(Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef)),
        ODataValue::String(String::new()),
        ODataValue::String("caf\u{e9} \"quoted\"".to_owned()),
        ODataValue::Binary(Vec::new()),
        ODataValue::Binary(vec![0xde, 0xad, 0xbe, 0xef]),
    ];
    if let Ok(decimal) = BigDecimal::from_str("79228162514264337593543950335.5") {
        values.push(ODataValue::Decimal(decimal));
    }
    if let Some(date) = NaiveDate::from_ymd_opt(2012, 2, 29) {
        values.push(ODataValue::Date(date));
    }
    if let Some(time) = NaiveTime::from_hms_milli_opt(23, 59, 59, 999) {
        values.push(ODataValue::TimeOfDay(time));
    }
    if let Some(instant) = DateTime::<Utc>::from_timestamp(1_330_473_600, 0) {
        values.push(ODataValue::DateTimeOffset(instant));
    }
    values
}

/// Typed samples covering every primitive kind and its edge values, a
/// typed null, and an untyped string.
#[must_use]
pub fn primitive_values() -> Vec<PrimitiveValue> {
    let mut values: Vec<PrimitiveValue> = samples().into_iter().map(PrimitiveValue::new).collect();
    values.push(PrimitiveValue::null("Edm.String"));
    values.push(PrimitiveValue::untyped("untyped"));
    debug!(count = values.len(), "generated primitive values");
    values
}

/// `Collection(Edm.Int32)` values over growing subsets of a small pool,
/// capped by `max_combinations`.
#[must_use]
pub fn primitive_collections(settings: &FixtureSettings) -> Vec<PrimitiveMultiValue> {
    let columns = vec![vec![1_i32, -1], vec![i32::MIN, i32::MAX]];
    let collections: Vec<_> = column_combinations(&columns, settings.max_combinations)
        .into_iter()
        .map(|items| {
            PrimitiveMultiValue::new("Edm.Int32")
                .with_items(items.into_iter().map(PrimitiveValue::new))
        })
        .collect();
    debug!(count = collections.len(), "generated primitive collections");
    collections
}
