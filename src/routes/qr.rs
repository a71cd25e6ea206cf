use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{get, post, web, HttpResponse, Responder, ResponseError};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::form::FormRecord;
use crate::services::qr::DOWNLOAD_FILENAME;
use crate::state::AppState;
use crate::submission::pipeline::{Decision, Outcome};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub client_id: Uuid,
    pub record: FormRecord,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub client_id: Uuid,
    pub generation: u64,
    pub choice: Decision,
}

fn outcome_json(outcome: Outcome) -> Value {
    match outcome {
        Outcome::Ready {
            generation,
            image,
            summarized,
        } => json!({
            "status": "ready",
            "generation": generation,
            "url": image.url,
            "image": image.data_url(),
            "summarized": summarized,
        }),
        Outcome::AwaitingDecision {
            generation,
            summary,
        } => json!({
            "status": "awaiting_decision",
            "generation": generation,
            "summary": summary,
        }),
        Outcome::Abandoned { generation } => json!({
            "status": "idle",
            "generation": generation,
        }),
    }
}

#[post("/api/qr")]
pub async fn submit(
    state: web::Data<AppState>,
    body: web::Json<SubmitRequest>,
) -> impl Responder {
    let SubmitRequest { client_id, record } = body.into_inner();

    match state.pipeline.submit(&state.desk, client_id, &record).await {
        Ok(outcome) => HttpResponse::Ok().json(outcome_json(outcome)),
        Err(e) => e.error_response(),
    }
}

#[post("/api/qr/decision")]
pub async fn decide(
    state: web::Data<AppState>,
    body: web::Json<DecisionRequest>,
) -> impl Responder {
    let DecisionRequest {
        client_id,
        generation,
        choice,
    } = body.into_inner();

    match state
        .pipeline
        .decide(&state.desk, client_id, generation, choice)
    {
        Ok(outcome) => HttpResponse::Ok().json(outcome_json(outcome)),
        Err(e) => e.error_response(),
    }
}

#[get("/api/qr/{client_id}")]
pub async fn status(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match state.desk.snapshot(path.into_inner()) {
        Some(snapshot) => HttpResponse::Ok().json(snapshot),
        None => HttpResponse::NotFound().body("No submission for this client"),
    }
}

#[get("/api/qr/{client_id}/download")]
pub async fn download(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let Some(image) = state.desk.image(path.into_inner()) else {
        return PipelineError::NotReady.error_response();
    };

    HttpResponse::Ok()
        .content_type("image/png")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(DOWNLOAD_FILENAME.to_string())],
        })
        .body(image.png)
}

pub fn init(cfg: &mut web::ServiceConfig) {
    cfg.service(submit);
    cfg.service(decide);
    cfg.service(download);
    cfg.service(status);
}
