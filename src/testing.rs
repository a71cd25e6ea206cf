//! Fixtures shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::web;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::form::record::{FormRecord, Gender};
use crate::form::serialize;
use crate::services::encoder::PayloadEncoder;
use crate::services::gate::LengthGate;
use crate::services::qr::QrRenderer;
use crate::services::summarizer::{SummarizeError, Summarizer};
use crate::state::AppState;
use crate::submission::desk::SubmissionDesk;
use crate::submission::pipeline::Pipeline;

pub const TEST_ORIGIN: &str = "http://qr.test";

pub fn sample_record() -> FormRecord {
    FormRecord {
        full_name: "Santhosh A".to_string(),
        dob: NaiveDate::from_ymd_opt(2003, 4, 21).unwrap(),
        gender: Gender::Male,
        blood_group: None,
        nationality: "Indian".to_string(),
        password: "secret123".to_string(),
        mobile_number: "9876543210".to_string(),
        email: "santhosh@example.com".to_string(),
        address: "123 Main St, Coimbatore".to_string(),
        roll_number: "URK21CS100".to_string(),
        course: "B.Sc Computer Science".to_string(),
        department: "School of Computing".to_string(),
        father_name: None,
        father_occupation: None,
        mother_name: None,
        mother_occupation: None,
        hobbies: None,
        other_info: None,
    }
}

/// A valid record whose serialized text is exactly `chars` long.
pub fn padded_record(chars: usize) -> FormRecord {
    let mut record = sample_record();
    record.other_info = Some("x".to_string());
    let base = serialize(&record).chars().count();
    assert!(chars >= base, "records serialize to at least {base} chars");

    record.other_info = Some("x".repeat(chars - base + 1));
    record
}

pub fn test_pipeline(summarizer: Arc<FakeSummarizer>) -> Pipeline {
    Pipeline::new(
        LengthGate::default(),
        summarizer,
        PayloadEncoder::new(TEST_ORIGIN),
        QrRenderer::default(),
    )
}

pub fn test_state(summarizer: Arc<FakeSummarizer>) -> web::Data<AppState> {
    web::Data::new(AppState::new(test_pipeline(summarizer), SubmissionDesk::default()))
}

/// Counts calls and answers with a canned summary or failure.
pub struct FakeSummarizer {
    reply: Option<String>,
    delay: Duration,
    calls: AtomicUsize,
    last_input: Mutex<Option<String>>,
}

impl FakeSummarizer {
    pub fn replying(summary: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(summary.to_string()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        })
    }

    pub fn with_delay_ms(self: Arc<Self>, millis: u64) -> Arc<Self> {
        Arc::new(Self {
            reply: self.reply.clone(),
            delay: Duration::from_millis(millis),
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_input(&self) -> Option<String> {
        self.last_input.lock().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock().unwrap() = Some(text.to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.reply.clone().ok_or(SummarizeError::Empty)
    }
}
