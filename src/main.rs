mod config;
mod error;
mod form;
mod routes;
mod services;
mod state;
mod submission;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::{info, warn};

use config::Config;
use services::encoder::PayloadEncoder;
use services::gate::LengthGate;
use services::qr::QrRenderer;
use services::summarizer::OllamaSummarizer;
use state::AppState;
use submission::desk::SubmissionDesk;
use submission::pipeline::Pipeline;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load().context("Failed to load configuration")?;

    let summarizer = OllamaSummarizer::new(
        &config.ollama_url,
        &config.summary_model,
        config.summary_threshold,
        config.summarizer_timeout,
    )
    .context("Failed to build summarization client")?;

    if summarizer.is_running().await {
        info!("✅ Ollama is running at {}", config.ollama_url);
    } else {
        warn!(
            "⚠️  Ollama is not reachable at {}. Payloads over {} characters cannot be summarized until it is started (`ollama serve`).",
            config.ollama_url, config.summary_threshold
        );
    }

    let pipeline = Pipeline::new(
        LengthGate::new(config.summary_threshold),
        Arc::new(summarizer),
        PayloadEncoder::new(config.public_origin.clone()),
        QrRenderer::default(),
    );
    let state = web::Data::new(AppState::new(
        pipeline,
        SubmissionDesk::with_idle_ttl(config.client_idle_ttl),
    ));

    info!("QR codes will link to {}/view", config.public_origin);
    info!("🚀 Listening on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::new("%a %U %s %b %Dms"))
            .app_data(state.clone())
            .configure(routes::init)
    })
    .bind((config.bind_addr.as_str(), config.port))
    .with_context(|| format!("Failed to bind {}:{}", config.bind_addr, config.port))?
    .run()
    .await
    .context("Server stopped unexpectedly")?;

    Ok(())
}
