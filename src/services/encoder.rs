use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

pub const VIEW_PATH: &str = "/view";
pub const DATA_PARAM: &str = "data";

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("payload is not valid base64")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Packs payload text into the `data` query parameter of the viewer URL.
#[derive(Debug, Clone)]
pub struct PayloadEncoder {
    origin: String,
}

impl PayloadEncoder {
    pub fn new(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    pub fn encode(&self, text: &str) -> String {
        general_purpose::URL_SAFE_NO_PAD.encode(text.as_bytes())
    }

    pub fn url(&self, text: &str) -> String {
        format!("{}{}?{}={}", self.origin, VIEW_PATH, DATA_PARAM, self.encode(text))
    }
}

/// Reverses [`PayloadEncoder::encode`].
///
/// Standard-alphabet input (with `+`, `/` and padding) is accepted too. A `+`
/// that went through form decoding arrives as a space and is put back. Empty
/// input decodes to empty text, matching `encode("")`.
pub fn decode(data: &str) -> Result<String, EncodingError> {
    let cleaned: String = data
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            ' ' | '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = general_purpose::URL_SAFE_NO_PAD.decode(cleaned.as_bytes())?;
    Ok(String::from_utf8(bytes)?)
}
