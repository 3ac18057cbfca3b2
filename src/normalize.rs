use serde_json::Value;

use crate::formats::StandardSheet;
use crate::mapping::MappingTable;

/// Rewrites raw sheet attributes into the table's standard keys.
///
/// Every standard key is present in the result. Absent or null source values
/// become `""`; anything else is copied as-is. A non-object `raw` is treated
/// as having no attributes.
pub fn normalize(raw: &Value, table: &MappingTable) -> StandardSheet {
    let attrs = raw.as_object();

    table
        .iter()
        .map(|(standard_key, source_key)| {
            let value = match attrs.and_then(|attrs| attrs.get(source_key)) {
                None | Some(Value::Null) => Value::String(String::new()),
                Some(value) => value.clone(),
            };
            (standard_key.to_owned(), value)
        })
        .collect()
}
