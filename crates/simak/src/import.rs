//! Reading data exported from the browser edition of the register.
//!
//! The browser edition keeps its state in `localStorage` as bare JSON arrays
//! under `brigif_data_v3` and `brigif_units_v3`. An export is accepted in
//! three shapes:
//!
//! - a record array (bare, or the versioned envelope this crate writes)
//! - a `localStorage` dump: an object mapping the browser keys to their
//!   stored values, either as JSON text or inline
//! - a unit array, read separately with [`parse_units`]

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::record::ViolationRecord;
use crate::storage::codec;

/// Browser key holding the record array.
pub const BROWSER_RECORDS_KEY: &str = "brigif_data_v3";

/// Browser key holding the unit array.
pub const BROWSER_UNITS_KEY: &str = "brigif_units_v3";

/// Records and units read from an export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserExport {
    /// Records to merge by id.
    pub records: Vec<ViolationRecord>,
    /// Units to append when missing.
    pub units: Vec<String>,
}

/// What an import changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Records that were not present before.
    pub inserted: usize,
    /// Records that replaced one with the same id.
    pub updated: usize,
    /// Units appended to the unit list.
    pub units_added: usize,
}

/// Parse a record export or a `localStorage` dump.
///
/// # Errors
///
/// Returns a corrupt-state error naming the offending key if the text is not
/// one of the accepted shapes or a record is malformed.
pub fn parse_export(raw: &str) -> Result<BrowserExport> {
    let value: Value = serde_json::from_str(raw).map_err(|source| Error::CorruptState {
        key: "import".to_string(),
        source,
    })?;

    match value {
        Value::Object(map)
            if map.contains_key(BROWSER_RECORDS_KEY) || map.contains_key(BROWSER_UNITS_KEY) =>
        {
            Ok(BrowserExport {
                records: dump_entry(&map, BROWSER_RECORDS_KEY)?,
                units: dump_entry(&map, BROWSER_UNITS_KEY)?,
            })
        }
        _ => Ok(BrowserExport {
            records: codec::decode(BROWSER_RECORDS_KEY, raw)?,
            units: Vec::new(),
        }),
    }
}

/// Parse a unit array export.
///
/// # Errors
///
/// Returns a corrupt-state error if the text is not a unit array.
pub fn parse_units(raw: &str) -> Result<Vec<String>> {
    codec::decode(BROWSER_UNITS_KEY, raw)
}

/// `localStorage` values are strings holding JSON; hand-built dumps may
/// inline the array instead.
fn dump_entry<T: serde::de::DeserializeOwned>(
    map: &Map<String, Value>,
    key: &str,
) -> Result<Vec<T>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(text)) => codec::decode(key, text),
        Some(inline) => codec::decode(key, &inline.to_string()),
    }
}
