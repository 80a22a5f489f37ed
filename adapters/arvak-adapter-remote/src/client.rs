//! Thin HTTP client wrapper around `reqwest`, reused across jobs.
//!
//! One `RemoteClient` is built per [`crate::backend::RemoteBackend`] and
//! shares a single connection pool; per-job state (headers, endpoint,
//! post path) lives on the job, never here.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::error::{RemoteError, RemoteResult};
use crate::protocol::{RequestEnvelope, SubmitResponse};

/// HTTP 300 ("multiple choices") — overloaded by the remote protocol to
/// mean "not ready yet".
const HTTP_NOT_READY_300: u16 = 300;
/// HTTP 425 ("too early") — the standard status for "not ready yet".
const HTTP_TOO_EARLY: u16 = 425;

/// Outcome of a single poll GET.
pub enum PollOutcome {
    /// Still computing; keep polling.
    NotReady,
    /// Completed: per-shot bit sequences.
    Data(Vec<Vec<u8>>),
    /// Remote reported an unrecoverable failure.
    Failed(String),
}

/// Pooled HTTP client for the remote execution protocol.
pub struct RemoteClient {
    http: reqwest::Client,
}

impl fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteClient").finish_non_exhaustive()
    }
}

impl RemoteClient {
    /// Build a new pooled client.
    pub fn new() -> RemoteResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http })
    }

    fn apply_headers(
        mut builder: reqwest::RequestBuilder,
        headers: &HashMap<String, String>,
    ) -> reqwest::RequestBuilder {
        for (key, value) in headers {
            let redacted = if key.eq_ignore_ascii_case("authorization") {
                "[REDACTED]"
            } else {
                value.as_str()
            };
            debug!(header = %key, value = %redacted, "setting request header");
            builder = builder.header(key, value);
        }
        builder
    }

    /// Submit a circuit; returns the remote job id on success.
    ///
    /// HTTP 5xx is a transient error (the caller drives the retry
    /// budget); other unexpected statuses are fatal.
    pub async fn submit(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        envelope: &RequestEnvelope,
    ) -> RemoteResult<i64> {
        debug!(url, "submitting circuit");
        let builder = Self::apply_headers(self.http.post(url), headers).json(envelope);
        let response = builder.send().await?;
        let status = response.status();

        if status.is_server_error() {
            return Err(RemoteError::RemoteTransient(format!(
                "submit returned {status}"
            )));
        }
        if !status.is_success() {
            return Err(RemoteError::RemoteFatal(format!(
                "submit returned {status}"
            )));
        }

        let parsed: SubmitResponse = response.json().await?;
        Ok(parsed.id)
    }

    /// Poll a job's result URL once.
    pub async fn poll(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> RemoteResult<PollOutcome> {
        debug!(url, "polling for results");
        let builder = Self::apply_headers(self.http.get(url), headers);
        let response = builder.send().await?;
        let status = response.status().as_u16();

        if status == HTTP_NOT_READY_300 || status == HTTP_TOO_EARLY {
            return Ok(PollOutcome::NotReady);
        }
        if status == 500 {
            return Ok(PollOutcome::Failed(format!("poll returned {status}")));
        }
        if status != 200 {
            return Err(RemoteError::RemoteTransient(format!(
                "poll returned {status}"
            )));
        }

        let parsed: crate::protocol::PollResponse = response.json().await?;
        match parsed.data {
            Some(data) => Ok(PollOutcome::Data(data)),
            None => Ok(PollOutcome::NotReady),
        }
    }
}
