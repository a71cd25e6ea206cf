use crate::submission::desk::SubmissionDesk;
use crate::submission::pipeline::Pipeline;

pub struct AppState {
    pub pipeline: Pipeline,
    pub desk: SubmissionDesk,
}

impl AppState {
    pub fn new(pipeline: Pipeline, desk: SubmissionDesk) -> Self {
        Self { pipeline, desk }
    }
}
