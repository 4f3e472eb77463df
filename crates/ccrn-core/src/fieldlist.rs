//! Field-list surface syntax: `ccrn=<type>.<group>/<version>, key=value, ...`

use crate::error::{CcrnError, Result};
use crate::resource::{CCRN_FIELD, Fields, Format, ParsedResource};

/// Literal prefix every field list starts with
pub const FIELD_LIST_PREFIX: &str = "ccrn=";

/// Parse a field list into a [`ParsedResource`]
///
/// Entries are split on commas and each must be `key=value` (split on the
/// first `=`). Keys and values are trimmed, and a value wrapped in a pair
/// of double quotes loses the quotes. Empty entries (`a=1,,b=2`) are ignored.
pub fn parse_field_list(input: &str) -> Result<ParsedResource> {
    if !input.starts_with(FIELD_LIST_PREFIX) {
        return Err(CcrnError::malformed(format!(
            "'{}' must start with '{}'",
            input, FIELD_LIST_PREFIX
        )));
    }

    let mut fields = Fields::new();
    for entry in input.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let (key, value) = entry.split_once('=').ok_or_else(|| {
            CcrnError::malformed(format!("invalid field '{}' (must be key=value)", entry))
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(CcrnError::malformed(format!(
                "invalid field '{}' (empty key)",
                entry
            )));
        }

        let value = strip_quotes(value.trim());
        if fields.insert(key.to_string(), value.to_string()).is_some() {
            return Err(CcrnError::malformed(format!(
                "duplicate field '{}'",
                key
            )));
        }
    }

    ParsedResource::new(Format::FieldList, fields, input)
}

/// Render fields as a field list, `ccrn` first
///
/// The remaining fields follow in key order; the order has no meaning.
/// Values are written literally, without quoting.
pub fn render_field_list(fields: &Fields) -> String {
    let mut out = String::from(FIELD_LIST_PREFIX);
    out.push_str(fields.get(CCRN_FIELD).map(String::as_str).unwrap_or(""));
    for (key, value) in fields {
        if key == CCRN_FIELD {
            continue;
        }
        out.push_str(", ");
        out.push_str(key);
        out.push('=');
        out.push_str(value);
    }
    out
}

fn strip_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
