//! Single-field base64 codec for Secret documents.
//!
//! Lets one `data` entry of a decrypted Secret be edited as plain text.
//! [`decode`] returns the cleartext together with a [`ReEncode`] value that
//! holds the parsed original document; applying it writes the edited text
//! back into that same document, so every other field (`apiVersion`, `kind`,
//! `metadata`, sibling `data` entries, unknown keys) survives untouched.

use std::fmt;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde_yaml::{Mapping, Value};
use tracing::trace;
use zeroize::Zeroizing;

use crate::core::types::FieldKey;
use crate::error::{CodecError, Result};

const DATA: &str = "data";

/// Standard alphabet, padding optional.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Writes edited cleartext back into the document it was decoded from.
///
/// Consumed by [`ReEncode::apply`], so it can be used once.
pub struct ReEncode {
    document: Value,
    field: FieldKey,
}

// The held document still carries every other decoded value.
impl fmt::Debug for ReEncode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReEncode")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

impl ReEncode {
    /// Field this value re-encodes.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Replace the field with the base64 encoding of `cleartext` and
    /// serialize the whole document.
    pub fn apply(mut self, cleartext: &[u8]) -> Result<Vec<u8>> {
        let encoded = STANDARD.encode(cleartext);
        let data = self
            .document
            .get_mut(DATA)
            .and_then(Value::as_mapping_mut)
            .ok_or(CodecError::NoData)?;
        data.insert(Value::String(self.field.clone()), Value::String(encoded));

        let out = serde_yaml::to_string(&self.document).map_err(CodecError::Serialize)?;
        trace!(field = %self.field, len = out.len(), "re-encoded");
        Ok(out.into_bytes())
    }
}

fn parse(document: &[u8]) -> Result<Value> {
    let value: Value = serde_yaml::from_slice(document).map_err(CodecError::Parse)?;
    if !value.is_mapping() {
        return Err(CodecError::NotAMapping.into());
    }
    Ok(value)
}

fn data(document: &Value) -> Option<&Mapping> {
    document
        .get(DATA)
        .and_then(Value::as_mapping)
        .filter(|m| !m.is_empty())
}

/// Decode one base64 field.
///
/// # Errors
///
/// - `CodecError::NoData` if the document has no `data` entries
/// - `CodecError::FieldNotFound` if `field` is absent or empty
/// - `CodecError::InvalidBase64` if the value is not base64 or decodes to nothing
pub fn decode(document: &[u8], field: &str) -> Result<(Zeroizing<Vec<u8>>, ReEncode)> {
    let parsed = parse(document)?;
    let entries = data(&parsed).ok_or(CodecError::NoData)?;

    let value = match entries.get(field) {
        None | Some(Value::Null) => return Err(CodecError::FieldNotFound(field.to_string()).into()),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(CodecError::FieldNotFound(field.to_string()).into())
        }
        Some(Value::String(s)) => s.trim(),
        Some(_) => return Err(CodecError::NotAString(field.to_string()).into()),
    };

    let cleartext = Zeroizing::new(LENIENT.decode(value).map_err(|e| CodecError::InvalidBase64 {
        field: field.to_string(),
        reason: e.to_string(),
    })?);
    if cleartext.is_empty() {
        return Err(CodecError::InvalidBase64 {
            field: field.to_string(),
            reason: "decoded value is empty".into(),
        }
        .into());
    }

    trace!(field, len = cleartext.len(), "decoded field");
    Ok((
        cleartext,
        ReEncode {
            document: parsed,
            field: field.to_string(),
        },
    ))
}

/// Number of `data` entries addressable by name (0 when there is no `data`
/// section).
pub fn count_entries(document: &[u8]) -> Result<usize> {
    Ok(field_keys(document)?.len())
}

/// Names of the `data` entries, in document order.
pub fn field_keys(document: &[u8]) -> Result<Vec<FieldKey>> {
    Ok(data(&parse(document)?)
        .map(|m| {
            m.keys()
                .filter_map(|k| k.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default())
}

/// The only `data` entry of the document.
///
/// # Errors
///
/// Returns `CodecError::NoData` when there are no entries and
/// `CodecError::AmbiguousDefault` when there is more than one.
pub fn default_key(document: &[u8]) -> Result<FieldKey> {
    let keys = field_keys(document)?;
    match keys.as_slice() {
        [] => Err(CodecError::NoData.into()),
        [only] => Ok(only.clone()),
        _ => Err(CodecError::AmbiguousDefault(keys.len()).into()),
    }
}
