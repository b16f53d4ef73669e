//! Text encodings for hub strings.

use crate::error::EncodingError;
use crate::types::TextEncoding;

/// Encode `text` to bytes. No terminator is added.
pub fn encode_text(text: &str, encoding: TextEncoding) -> Result<Vec<u8>, EncodingError> {
    match encoding {
        TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
        TextEncoding::Latin1 => text
            .chars()
            .enumerate()
            .map(|(index, ch)| {
                u8::try_from(u32::from(ch)).map_err(|_| EncodingError::Unencodable {
                    ch,
                    index,
                    encoding: encoding.name(),
                })
            })
            .collect(),
    }
}

/// Decode bytes to text.
pub fn decode_text(bytes: &[u8], encoding: TextEncoding) -> Result<String, EncodingError> {
    match encoding {
        TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        TextEncoding::Utf8 => std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| EncodingError::InvalidBytes {
                valid_up_to: e.valid_up_to(),
                encoding: encoding.name(),
            }),
    }
}
