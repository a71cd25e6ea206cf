use actix_web::{post, web, HttpResponse, Responder};
use log::warn;
use serde::Deserialize;

use crate::services::summarizer::SummaryResponse;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
}

/// The summarization action on its own. Always answers 200 with the
/// success/failure envelope, as the form expects.
#[post("/api/summarize")]
pub async fn summarize(
    state: web::Data<AppState>,
    body: web::Json<SummarizeRequest>,
) -> impl Responder {
    let result = state.pipeline.summarizer().summarize(&body.text).await;
    if let Err(e) = &result {
        warn!("Summarization failed: {}", e);
    }

    HttpResponse::Ok().json(SummaryResponse::from(result))
}

pub fn init(cfg: &mut web::ServiceConfig) {
    cfg.service(summarize);
}
