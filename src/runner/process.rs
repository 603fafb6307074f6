use std::{
    io::ErrorKind,
    process::Stdio,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::{io::AsyncReadExt, process::Command};

use crate::{
    config::Config,
    error::ExecuteError,
    runner::{CodeRunner, LanguageSpec, RunOutput, RunRequest},
};

pub struct ProcessRunner {
    config: Config,
}

impl ProcessRunner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl CodeRunner for ProcessRunner {
    async fn run(&self, request: RunRequest) -> Result<RunOutput, ExecuteError> {
        let spec = LanguageSpec::for_language(request.language, &self.config);
        let started = Instant::now();

        let mut cmd = Command::new(&spec.binary);
        cmd.args(spec.eval_args);
        cmd.arg(&request.code);
        cmd.env_clear();
        if let Some(path) = std::env::var_os("PATH") {
            cmd.env("PATH", path);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                ExecuteError::RuntimeUnavailable {
                    language: request.language,
                }
            } else {
                ExecuteError::Internal(err.to_string())
            }
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExecuteError::Internal("missing stdout pipe".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExecuteError::Internal("missing stderr pipe".to_string()))?;
        let limit = self.config.max_output_bytes;
        let stdout_task = tokio::spawn(async move { read_limited(stdout, limit).await });
        let stderr_task = tokio::spawn(async move { read_limited(stderr, limit).await });

        let wait_result =
            tokio::time::timeout(Duration::from_millis(spec.timeout_ms), child.wait()).await;

        let (exit_code, timed_out) = match wait_result {
            Ok(Ok(status)) => (status.code().unwrap_or(-1), false),
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => {
                let _ = child.kill().await;
                (-1, true)
            }
        };

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        tracing::debug!(
            execution_id = %request.id,
            language = %request.language,
            exit_code,
            timed_out,
            duration_ms = started.elapsed().as_millis() as u64,
            "interpreter finished"
        );

        Ok(RunOutput {
            stdout: String::from_utf8_lossy(&stdout).to_string(),
            stderr: String::from_utf8_lossy(&stderr).to_string(),
            exit_code,
            duration_ms: started.elapsed().as_millis(),
            timed_out,
        })
    }
}

async fn read_limited<R>(mut reader: R, limit: usize) -> Vec<u8>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut out = Vec::with_capacity(limit.min(8192));
    let mut chunk = [0u8; 4096];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                if out.len() < limit {
                    let remaining = limit - out.len();
                    out.extend_from_slice(&chunk[..remaining.min(n)]);
                }
            }
            Err(_) => break,
        }
    }
    out
}
