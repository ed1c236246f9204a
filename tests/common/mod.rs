#![allow(dead_code)]

use async_trait::async_trait;
use neuroscan_client::models::{BatchProgress, BatchResult};
use neuroscan_client::{ErrorKind, InferenceBackend, InferenceError, UploadItem};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};

/// 模拟调用的结果
#[derive(Clone)]
pub enum Outcome {
    Respond(Value),
    Fail(ErrorKind),
    /// 永不结束
    Hang,
}

#[derive(Clone)]
pub struct Step {
    pub latency: Duration,
    pub outcome: Outcome,
}

/// 一次 predict 调用的记录
#[derive(Debug, Clone)]
pub struct Call {
    pub name: String,
    pub started: Instant,
    pub settled: Option<Instant>,
    /// 调用开始时观察到的进度
    pub progress: Option<BatchProgress>,
    /// 调用开始时观察到的累积结果数
    pub published: Option<usize>,
}

pub struct MockBackend {
    steps: HashMap<String, Step>,
    connect_fails: bool,
    connects: Mutex<usize>,
    calls: Mutex<Vec<Call>>,
    progress: Option<watch::Receiver<BatchProgress>>,
    results: Option<watch::Receiver<Vec<Arc<BatchResult>>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            steps: HashMap::new(),
            connect_fails: false,
            connects: Mutex::new(0),
            calls: Mutex::new(Vec::new()),
            progress: None,
            results: None,
        }
    }

    pub fn respond(mut self, name: &str, latency_ms: u64, body: Value) -> Self {
        self.steps.insert(
            name.to_string(),
            Step {
                latency: Duration::from_millis(latency_ms),
                outcome: Outcome::Respond(body),
            },
        );
        self
    }

    pub fn fail(mut self, name: &str, kind: ErrorKind) -> Self {
        self.steps.insert(
            name.to_string(),
            Step {
                latency: Duration::ZERO,
                outcome: Outcome::Fail(kind),
            },
        );
        self
    }

    pub fn hang(mut self, name: &str) -> Self {
        self.steps.insert(
            name.to_string(),
            Step {
                latency: Duration::ZERO,
                outcome: Outcome::Hang,
            },
        );
        self
    }

    pub fn refuse_connect(mut self) -> Self {
        self.connect_fails = true;
        self
    }

    pub fn observe(
        mut self,
        progress: watch::Receiver<BatchProgress>,
        results: watch::Receiver<Vec<Arc<BatchResult>>>,
    ) -> Self {
        self.progress = Some(progress);
        self.results = Some(results);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_names(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.name).collect()
    }

    pub fn connect_count(&self) -> usize {
        *self.connects.lock().unwrap()
    }
}

pub fn error_of(kind: ErrorKind) -> InferenceError {
    match kind {
        ErrorKind::Connectivity => InferenceError::unreachable(
            "http://mock",
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
        ),
        ErrorKind::RouteNotFound => InferenceError::EndpointNotFound {
            endpoint: "http://mock/run/predict".to_string(),
        },
        ErrorKind::MalformedResponse => InferenceError::malformed("missing data"),
        ErrorKind::Timeout => InferenceError::Timeout {
            after: Duration::from_secs(1),
        },
        ErrorKind::Unknown => InferenceError::unknown("scanner exploded"),
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn connect(&self) -> Result<(), InferenceError> {
        *self.connects.lock().unwrap() += 1;
        if self.connect_fails {
            Err(error_of(ErrorKind::Connectivity))
        } else {
            Ok(())
        }
    }

    async fn predict(&self, item: &UploadItem) -> Result<Value, InferenceError> {
        let position = {
            let progress = self.progress.as_ref().map(|rx| *rx.borrow());
            let published = self.results.as_ref().map(|rx| rx.borrow().len());
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call {
                name: item.name.clone(),
                started: Instant::now(),
                settled: None,
                progress,
                published,
            });
            calls.len() - 1
        };

        let step = self.steps.get(&item.name).cloned().unwrap_or(Step {
            latency: Duration::ZERO,
            outcome: Outcome::Respond(normal_response()),
        });

        if !step.latency.is_zero() {
            sleep(step.latency).await;
        }

        let outcome = match step.outcome {
            Outcome::Respond(body) => Ok(body),
            Outcome::Fail(kind) => Err(error_of(kind)),
            Outcome::Hang => futures::future::pending().await,
        };

        self.calls.lock().unwrap()[position].settled = Some(Instant::now());
        outcome
    }
}

pub fn item(name: &str, index: usize) -> UploadItem {
    UploadItem::new(name, vec![0x5c, 0x01, 0x00, 0x00]).with_index(index)
}

pub fn items(names: &[&str]) -> Vec<UploadItem> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| item(name, i))
        .collect()
}

pub fn normal_response() -> Value {
    json!({
        "predictions": [["Normal", 0.9], ["Aneurysm", 0.1]],
        "predicted_class": "Normal",
        "confidence": 0.9
    })
}

/// 带扫描和热力图体数据的响应（base64 编码）
pub fn volume_response() -> Value {
    json!({
        "predictions": [["Normal", 0.3], ["Aneurysm", 0.7]],
        "predicted_class": "Aneurysm",
        "confidence": 0.7,
        "scan_data": "AQIDBA==",
        "heatmap_data": "BQY="
    })
}

pub fn aneurysm_response() -> Value {
    json!({
        "predictions": [["Normal", 0.2], ["Aneurysm", 0.8]],
        "predicted_class": "Aneurysm",
        "confidence": 0.8
    })
}
