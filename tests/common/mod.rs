//! Shared test helpers

use async_trait::async_trait;
use serde_json::Value;
use sports_data_harvester::api::{ApiError, ApiResult, ApiTransport};
use sports_data_harvester::harvest::HarvestConfig;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// One scripted response for an endpoint.
#[derive(Debug, Clone)]
pub enum Response {
    Ok(Value),
    Status(u16),
}

impl Response {
    fn materialize(&self) -> ApiResult<Value> {
        match self {
            Response::Ok(value) => Ok(value.clone()),
            Response::Status(status) => Err(ApiError::Status {
                status: *status,
                message: "scripted failure".to_string(),
            }),
        }
    }
}

/// Transport that plays back per-endpoint response scripts and records
/// every call. An endpoint's last scripted response repeats once the queue
/// ahead of it is drained; an unscripted endpoint fails with a 404.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Response>>>,
    log: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, endpoint: &str, payload: Value) -> Self {
        self.push(endpoint, Response::Ok(payload))
    }

    pub fn status(self, endpoint: &str, status: u16) -> Self {
        self.push(endpoint, Response::Status(status))
    }

    /// Script the same failure `times` times in a row.
    pub fn status_times(mut self, endpoint: &str, status: u16, times: usize) -> Self {
        for _ in 0..times {
            self = self.status(endpoint, status);
        }
        self
    }

    fn push(self, endpoint: &str, response: Response) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(endpoint.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Number of calls made to `endpoint`.
    pub fn calls(&self, endpoint: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == endpoint)
            .count()
    }

    /// Total calls across all endpoints.
    pub fn total_calls(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

#[async_trait]
impl ApiTransport for ScriptedTransport {
    async fn fetch(&self, endpoint: &str) -> ApiResult<Value> {
        self.log.lock().unwrap().push(endpoint.to_string());

        let mut scripts = self.scripts.lock().unwrap();
        let Some(queue) = scripts.get_mut(endpoint) else {
            return Err(ApiError::Status {
                status: 404,
                message: format!("no script for {endpoint}"),
            });
        };
        match queue.len() {
            0 => Err(ApiError::Status {
                status: 404,
                message: format!("script exhausted for {endpoint}"),
            }),
            // Keep replaying the final response
            1 => queue.front().unwrap().materialize(),
            _ => queue.pop_front().unwrap().materialize(),
        }
    }
}

/// Harvest config with all pacing zeroed so tests never wait on the pacer;
/// retry backoff still applies.
pub fn instant_config() -> HarvestConfig {
    HarvestConfig {
        request_delay: Duration::ZERO,
        request_jitter: Duration::ZERO,
        shard_delay: Duration::ZERO,
        shard_jitter: Duration::ZERO,
        ..Default::default()
    }
}
