mod language;
mod process;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{error::ExecuteError, models::Language};

pub use language::LanguageSpec;
pub use process::ProcessRunner;

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub id: Uuid,
    pub language: Language,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration_ms: u128,
    pub timed_out: bool,
}

/// Backend seam for running untrusted source; tests inject stubs through it.
#[async_trait]
pub trait CodeRunner: Send + Sync {
    async fn run(&self, request: RunRequest) -> Result<RunOutput, ExecuteError>;
}
