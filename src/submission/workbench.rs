use serde::Serialize;

use crate::error::PipelineError;
use crate::services::qr::QrImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Validating,
    Serializing,
    DirectEncode,
    Summarizing,
    AwaitingUserDecision,
    Encoding,
    Rendering,
    Ready,
}

/// Proof that a caller is driving the latest submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
}

/// Everything one client's form knows about its current submission.
///
/// Each `begin` bumps the generation and wipes the previous result; any later
/// step presented with an older ticket is refused with `Superseded`.
#[derive(Debug, Clone)]
pub struct Workbench {
    generation: u64,
    stage: Stage,
    pending_summary: Option<String>,
    image: Option<QrImage>,
    last_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbenchSnapshot {
    pub stage: Stage,
    pub generation: u64,
    pub has_image: bool,
    pub pending_summary: Option<String>,
    pub last_error: Option<String>,
}

impl Default for Workbench {
    fn default() -> Self {
        Self {
            generation: 0,
            stage: Stage::Idle,
            pending_summary: None,
            image: None,
            last_error: None,
        }
    }
}

impl Workbench {
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.stage = Stage::Validating;
        self.pending_summary = None;
        self.image = None;
        self.last_error = None;
        Ticket {
            generation: self.generation,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn image(&self) -> Option<&QrImage> {
        self.image.as_ref()
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.generation == self.generation
    }

    fn check(&self, ticket: Ticket) -> Result<(), PipelineError> {
        if self.is_current(ticket) {
            Ok(())
        } else {
            Err(PipelineError::Superseded)
        }
    }

    pub fn advance(&mut self, ticket: Ticket, stage: Stage) -> Result<(), PipelineError> {
        self.check(ticket)?;
        self.stage = stage;
        Ok(())
    }

    pub fn park_summary(&mut self, ticket: Ticket, summary: String) -> Result<(), PipelineError> {
        self.check(ticket)?;
        self.stage = Stage::AwaitingUserDecision;
        self.pending_summary = Some(summary);
        Ok(())
    }

    /// Accepts the pending summary and moves on to encoding it.
    pub fn take_summary(&mut self, generation: u64) -> Result<(Ticket, String), PipelineError> {
        let ticket = Ticket { generation };
        self.check(ticket)?;
        if self.stage != Stage::AwaitingUserDecision {
            return Err(PipelineError::NoPendingDecision);
        }
        let summary = self
            .pending_summary
            .take()
            .ok_or(PipelineError::NoPendingDecision)?;
        self.stage = Stage::Encoding;
        Ok((ticket, summary))
    }

    /// Drops the pending summary and hands the form back to the user.
    pub fn discard_summary(&mut self, generation: u64) -> Result<(), PipelineError> {
        self.check(Ticket { generation })?;
        if self.stage != Stage::AwaitingUserDecision {
            return Err(PipelineError::NoPendingDecision);
        }
        self.pending_summary = None;
        self.stage = Stage::Idle;
        Ok(())
    }

    pub fn publish(&mut self, ticket: Ticket, image: QrImage) -> Result<(), PipelineError> {
        self.check(ticket)?;
        self.image = Some(image);
        self.stage = Stage::Ready;
        Ok(())
    }

    /// Returns to `Idle` after a failure. Stale tickets leave the bench untouched.
    pub fn abort(&mut self, ticket: Ticket, reason: &PipelineError) {
        if self.is_current(ticket) {
            self.stage = Stage::Idle;
            self.pending_summary = None;
            self.image = None;
            self.last_error = Some(reason.to_string());
        }
    }

    pub fn snapshot(&self) -> WorkbenchSnapshot {
        WorkbenchSnapshot {
            stage: self.stage,
            generation: self.generation,
            has_image: self.image.is_some(),
            pending_summary: self.pending_summary.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> QrImage {
        QrImage {
            url: "http://localhost/view?data=x".to_string(),
            png: vec![1, 2, 3],
        }
    }

    #[test]
    fn begin_resets_previous_result() {
        let mut bench = Workbench::default();
        let first = bench.begin();
        bench.publish(first, image()).unwrap();
        assert_eq!(bench.stage(), Stage::Ready);

        let second = bench.begin();
        assert_eq!(second.generation, first.generation + 1);
        assert_eq!(bench.stage(), Stage::Validating);
        assert!(bench.image().is_none());
    }

    #[test]
    fn stale_ticket_cannot_touch_newer_submission() {
        let mut bench = Workbench::default();
        let stale = bench.begin();
        let fresh = bench.begin();

        assert!(matches!(
            bench.park_summary(stale, "late".into()),
            Err(PipelineError::Superseded)
        ));
        assert!(matches!(bench.publish(stale, image()), Err(PipelineError::Superseded)));

        bench.abort(stale, &PipelineError::Summarization("late failure".into()));
        assert_eq!(bench.stage(), Stage::Validating);
        assert!(bench.snapshot().last_error.is_none());

        bench.advance(fresh, Stage::Serializing).unwrap();
        assert_eq!(bench.stage(), Stage::Serializing);
    }

    #[test]
    fn summary_decision_requires_waiting_stage() {
        let mut bench = Workbench::default();
        let ticket = bench.begin();
        assert!(matches!(
            bench.take_summary(ticket.generation),
            Err(PipelineError::NoPendingDecision)
        ));

        bench.park_summary(ticket, "short".into()).unwrap();
        assert_eq!(bench.snapshot().pending_summary.as_deref(), Some("short"));

        let (taken, summary) = bench.take_summary(ticket.generation).unwrap();
        assert_eq!(taken, ticket);
        assert_eq!(summary, "short");
        assert_eq!(bench.stage(), Stage::Encoding);
        assert!(matches!(
            bench.discard_summary(ticket.generation),
            Err(PipelineError::NoPendingDecision)
        ));
    }

    #[test]
    fn discarding_returns_to_idle() {
        let mut bench = Workbench::default();
        let ticket = bench.begin();
        bench.park_summary(ticket, "short".into()).unwrap();

        bench.discard_summary(ticket.generation).unwrap();
        let snapshot = bench.snapshot();
        assert_eq!(snapshot.stage, Stage::Idle);
        assert!(snapshot.pending_summary.is_none());
        assert!(!snapshot.has_image);
    }
}
