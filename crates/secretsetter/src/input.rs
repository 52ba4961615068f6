//! Secret value acquisition

use crate::store::SecretValue;
use std::io::{self, Read};

/// Read the whole stream and trim surrounding whitespace.
///
/// An empty value is valid. Bytes that are not UTF-8 fail with
/// `InvalidData` rather than being replaced.
pub fn read_secret_value<R: Read>(mut reader: R) -> io::Result<SecretValue> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    Ok(SecretValue::new(raw.trim()))
}
