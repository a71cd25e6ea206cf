use std::collections::BTreeMap;

use actix_web::error::JsonPayloadError;
use actix_web::{http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::services::{encoder::EncodingError, qr::RenderError};

/// Field name to the messages raised for it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Some fields need attention")]
    Validation(FieldErrors),

    #[error("{0}")]
    Summarization(String),

    #[error("Failed to encode data: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Failed to generate QR code: {0}")]
    Render(#[from] RenderError),

    #[error("A newer submission replaced this one")]
    Superseded,

    #[error("There is no summary waiting for a decision")]
    NoPendingDecision,

    #[error("No QR code has been generated yet")]
    NotReady,
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "validation",
            PipelineError::Summarization(_) => "summarization",
            PipelineError::Encoding(_) => "encoding",
            PipelineError::Render(_) => "render",
            PipelineError::Superseded => "superseded",
            PipelineError::NoPendingDecision => "no_pending_decision",
            PipelineError::NotReady => "not_ready",
        }
    }
}

impl From<ValidationErrors> for PipelineError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            fields.insert(camel_case(field), messages);
        }
        PipelineError::Validation(fields)
    }
}

/// Field keys follow the JSON the client sent (`mobileNumber`, not `mobile_number`).
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Error handler for `web::JsonConfig`. Bodies that parse as JSON but do not
/// fit the request shape are reported like any other validation failure.
pub fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        JsonPayloadError::Deserialize(e) if e.is_data() => {
            PipelineError::Validation(deserialize_fields(&e)).into()
        }
        other => other.into(),
    }
}

fn deserialize_fields(err: &serde_json::Error) -> FieldErrors {
    let message = err.to_string();
    let message = message
        .split(" at line ")
        .next()
        .unwrap_or_default()
        .to_string();

    let mut fields = FieldErrors::new();
    match message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
    {
        Some(field) => {
            fields.insert(field.to_string(), vec![format!("{field} is required.")]);
        }
        None => {
            fields.insert("record".to_string(), vec![message]);
        }
    }
    fields
}

impl ResponseError for PipelineError {
    fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::Summarization(_) => StatusCode::BAD_GATEWAY,
            PipelineError::Encoding(_) => StatusCode::BAD_REQUEST,
            PipelineError::Render(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::Superseded | PipelineError::NoPendingDecision => StatusCode::CONFLICT,
            PipelineError::NotReady => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "success": false,
            "kind": self.kind(),
            "error": self.to_string(),
        });
        if let PipelineError::Validation(fields) = self {
            body["fields"] = json!(fields);
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}
