//! Emitter (§4.7): pushes `total_passed` to the external aggregator over
//! HTTP, dropping a failed send rather than retrying it.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

const SEND_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Entry,
    Exit,
}

#[derive(Debug, Serialize)]
struct UpdatePassedPayload {
    role: Role,
    total_cars_passed: u64,
}

#[derive(Debug)]
pub enum EmitError {
    Request(reqwest::Error),
    Status(reqwest::StatusCode),
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::Request(err) => write!(f, "failed to reach aggregator: {}", err),
            EmitError::Status(status) => write!(f, "aggregator rejected update: {}", status),
        }
    }
}

impl std::error::Error for EmitError {}

impl From<reqwest::Error> for EmitError {
    fn from(err: reqwest::Error) -> Self {
        EmitError::Request(err)
    }
}

/// Posts one `total_passed` reading to the aggregator. Callers own retry
/// policy; per §4.7 a failed send is logged and dropped, never retried past
/// the next increment.
pub struct Emitter {
    client: reqwest::Client,
    endpoint: String,
    role: Role,
}

impl Emitter {
    pub fn new(endpoint: impl Into<String>, role: Role) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("reqwest client with a fixed timeout should never fail to build");
        Self {
            client,
            endpoint: endpoint.into(),
            role,
        }
    }

    pub async fn send(&self, total_passed: u64) -> Result<(), EmitError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&UpdatePassedPayload {
                role: self.role,
                total_cars_passed: total_passed,
            })
            .send()
            .await?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(EmitError::Status(response.status()));
        }
        Ok(())
    }
}
