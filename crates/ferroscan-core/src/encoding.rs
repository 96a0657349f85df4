//! Response body decompression.

use std::io::Read;

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};

use crate::FetchError;

/// Encodings offered in `Accept-Encoding`.
pub const ACCEPT_ENCODING: &str = "gzip, deflate";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Undo the codings listed in a `Content-Encoding` header.
///
/// Codings are removed last-applied first. A gzip body is also recognized by
/// its magic bytes when the header is missing. Unknown codings are an error
/// rather than a silent pass-through of compressed bytes.
pub fn decode_body(content_encoding: Option<&str>, body: &[u8]) -> Result<Vec<u8>, FetchError> {
    let codings = content_encoding
        .map(|header| {
            header
                .split(',')
                .map(|coding| coding.trim().to_ascii_lowercase())
                .filter(|coding| !coding.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if codings.is_empty() {
        if body.starts_with(&GZIP_MAGIC) {
            return gunzip(body);
        }
        return Ok(body.to_vec());
    }

    let mut decoded = body.to_vec();
    for coding in codings.iter().rev() {
        decoded = match coding.as_str() {
            "gzip" | "x-gzip" => gunzip(&decoded)?,
            "deflate" => inflate(&decoded)?,
            "identity" => decoded,
            other => {
                return Err(FetchError::Decode {
                    encoding: other.to_owned(),
                    message: String::from("unsupported content encoding"),
                })
            }
        };
    }
    Ok(decoded)
}

/// Decode to text, replacing invalid UTF-8 sequences.
pub fn decode_text(content_encoding: Option<&str>, body: &[u8]) -> Result<String, FetchError> {
    let bytes = decode_body(content_encoding, body)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn gunzip(body: &[u8]) -> Result<Vec<u8>, FetchError> {
    let mut decoded = Vec::new();
    GzDecoder::new(body)
        .read_to_end(&mut decoded)
        .map_err(|e| decode_error("gzip", &e))?;
    Ok(decoded)
}

/// `deflate` is zlib-wrapped per RFC 9110, but some servers send raw deflate.
fn inflate(body: &[u8]) -> Result<Vec<u8>, FetchError> {
    let mut decoded = Vec::new();
    if ZlibDecoder::new(body).read_to_end(&mut decoded).is_ok() {
        return Ok(decoded);
    }

    decoded.clear();
    DeflateDecoder::new(body)
        .read_to_end(&mut decoded)
        .map_err(|e| decode_error("deflate", &e))?;
    Ok(decoded)
}

fn decode_error(encoding: &str, error: &std::io::Error) -> FetchError {
    FetchError::Decode {
        encoding: encoding.to_owned(),
        message: error.to_string(),
    }
}
