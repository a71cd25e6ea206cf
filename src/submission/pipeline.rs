use std::sync::Arc;

use log::{error, info, warn};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::desk::SubmissionDesk;
use super::workbench::{Stage, Ticket};
use crate::error::PipelineError;
use crate::form::{serialize, FormRecord};
use crate::services::encoder::PayloadEncoder;
use crate::services::gate::{LengthGate, Route};
use crate::services::qr::{QrImage, QrRenderer};
use crate::services::summarizer::Summarizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    UseSummary,
    EditManually,
}

#[derive(Debug)]
pub enum Outcome {
    Ready {
        generation: u64,
        image: QrImage,
        summarized: bool,
    },
    AwaitingDecision {
        generation: u64,
        summary: String,
    },
    Abandoned {
        generation: u64,
    },
}

pub struct Pipeline {
    gate: LengthGate,
    summarizer: Arc<dyn Summarizer>,
    encoder: PayloadEncoder,
    renderer: QrRenderer,
}

impl Pipeline {
    pub fn new(
        gate: LengthGate,
        summarizer: Arc<dyn Summarizer>,
        encoder: PayloadEncoder,
        renderer: QrRenderer,
    ) -> Self {
        Self {
            gate,
            summarizer,
            encoder,
            renderer,
        }
    }

    pub fn summarizer(&self) -> &dyn Summarizer {
        self.summarizer.as_ref()
    }

    /// Runs one form submission for `client` up to a ready image or a summary
    /// waiting for the user's decision.
    pub async fn submit(
        &self,
        desk: &SubmissionDesk,
        client: Uuid,
        record: &FormRecord,
    ) -> Result<Outcome, PipelineError> {
        let ticket = desk.with_bench(client, |b| b.begin());
        info!("Submission {} started for client {}", ticket.generation, client);

        let result = self.run(desk, client, ticket, record).await;
        if let Err(e) = &result {
            match e {
                PipelineError::Superseded => {
                    warn!("Submission {} for client {} was superseded", ticket.generation, client)
                }
                PipelineError::Validation(_) => {
                    info!("Submission {} for client {} failed validation", ticket.generation, client)
                }
                _ => error!("Submission {} for client {} failed: {}", ticket.generation, client, e),
            }
            desk.with_bench(client, |b| b.abort(ticket, e));
        }
        result
    }

    async fn run(
        &self,
        desk: &SubmissionDesk,
        client: Uuid,
        ticket: Ticket,
        record: &FormRecord,
    ) -> Result<Outcome, PipelineError> {
        record.validate()?;

        desk.with_bench(client, |b| b.advance(ticket, Stage::Serializing))?;
        let text = serialize(record);

        match self.gate.route(&text) {
            Route::Direct => {
                desk.with_bench(client, |b| b.advance(ticket, Stage::DirectEncode))?;
                self.finish(desk, client, ticket, &text, false)
            }
            Route::Summarize => {
                info!(
                    "Payload of {} chars exceeds {}, summarizing",
                    text.chars().count(),
                    self.gate.threshold()
                );
                desk.with_bench(client, |b| b.advance(ticket, Stage::Summarizing))?;

                let summary = match self.summarizer.summarize(&text).await {
                    Ok(summary) => summary,
                    Err(_) if !desk.with_bench(client, |b| b.is_current(ticket)) => {
                        return Err(PipelineError::Superseded)
                    }
                    Err(e) => return Err(PipelineError::Summarization(e.to_string())),
                };

                desk.with_bench(client, |b| b.park_summary(ticket, summary.clone()))?;
                Ok(Outcome::AwaitingDecision {
                    generation: ticket.generation,
                    summary,
                })
            }
        }
    }

    /// Applies the user's answer to a pending summary.
    pub fn decide(
        &self,
        desk: &SubmissionDesk,
        client: Uuid,
        generation: u64,
        decision: Decision,
    ) -> Result<Outcome, PipelineError> {
        match decision {
            Decision::EditManually => {
                desk.with_bench(client, |b| b.discard_summary(generation))?;
                info!("Client {} declined summary {}", client, generation);
                Ok(Outcome::Abandoned { generation })
            }
            Decision::UseSummary => {
                let (ticket, summary) = desk.with_bench(client, |b| b.take_summary(generation))?;
                info!("Client {} accepted summary {}", client, generation);

                let result = self.finish(desk, client, ticket, &summary, true);
                if let Err(e) = &result {
                    error!("Rendering summary {} for client {} failed: {}", generation, client, e);
                    desk.with_bench(client, |b| b.abort(ticket, e));
                }
                result
            }
        }
    }

    fn finish(
        &self,
        desk: &SubmissionDesk,
        client: Uuid,
        ticket: Ticket,
        text: &str,
        summarized: bool,
    ) -> Result<Outcome, PipelineError> {
        desk.with_bench(client, |b| b.advance(ticket, Stage::Encoding))?;
        let url = self.encoder.url(text);

        desk.with_bench(client, |b| b.advance(ticket, Stage::Rendering))?;
        let image = self.renderer.render(&url)?;

        desk.with_bench(client, |b| b.publish(ticket, image.clone()))?;
        info!(
            "QR code {} ready for client {} ({} byte PNG)",
            ticket.generation,
            client,
            image.png.len()
        );

        Ok(Outcome::Ready {
            generation: ticket.generation,
            image,
            summarized,
        })
    }
}
