//! 单元测试共用的假图片编辑服务

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::error::EditError;
use crate::models::{RawFile, ToolMode};
use crate::services::ImageEditor;

pub(crate) const CLEAN_PNG: &str = "data:image/png;base64,Y2xlYW4=";

/// 按脚本依次返回结果的编辑服务，脚本用完后一律成功
#[derive(Default)]
pub(crate) struct ScriptedEditor {
    script: Mutex<VecDeque<Result<String, EditError>>>,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
    delay: Option<Duration>,
}

impl ScriptedEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(results: Vec<Result<String, EditError>>) -> Self {
        Self {
            script: Mutex::new(results.into()),
            ..Self::default()
        }
    }

    /// 每次调用都要先拿到一个许可
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageEditor for ScriptedEditor {
    async fn edit(
        &self,
        _encoded_payload: &str,
        _mime_type: &str,
        _mode: ToolMode,
    ) -> Result<String, EditError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        next.unwrap_or_else(|| Ok(CLEAN_PNG.to_string()))
    }
}

pub(crate) fn image(name: &str) -> RawFile {
    RawFile::from_bytes(name, "image/png", name.as_bytes().to_vec())
}
