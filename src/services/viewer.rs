use thiserror::Error;

use super::encoder::{self, EncodingError};

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("this code carries no password line")]
    Locked,

    #[error("incorrect password")]
    WrongPassword,
}

/// One "Label: value" line of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub label: String,
    pub value: String,
}

/// Decodes `data` and reveals its lines if `password` matches the embedded one.
/// The password line itself is not returned.
pub fn unlock(data: &str, password: &str) -> Result<Vec<Entry>, ViewerError> {
    let text = encoder::decode(data)?;
    let entries = parse(&text);

    let expected = entries
        .iter()
        .find(|e| e.label == "Password")
        .map(|e| e.value.as_str())
        .ok_or(ViewerError::Locked)?;

    if expected != password {
        return Err(ViewerError::WrongPassword);
    }

    Ok(entries.into_iter().filter(|e| e.label != "Password").collect())
}

fn parse(text: &str) -> Vec<Entry> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match line.split_once(':') {
            Some((label, value)) => Entry {
                label: label.trim().to_string(),
                value: value.strip_prefix(' ').unwrap_or(value).to_string(),
            },
            None => Entry {
                label: String::new(),
                value: line.trim().to_string(),
            },
        })
        .collect()
}
