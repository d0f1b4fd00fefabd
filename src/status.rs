/*
Bot state shared between the pipeline and the control panel. A small
explicit object behind a lock, owned by the runner and injected into
the dashboard handler.
*/

use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleStage {
    #[default]
    Idle,
    Generating,
    Extracting,
    ImageRendering,
    AudioRendering,
    VideoAssembling,
    Publishing,
    Recording,
    Aborted,
}

impl std::fmt::Display for CycleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            CycleStage::Idle => "idle",
            CycleStage::Generating => "generating",
            CycleStage::Extracting => "extracting",
            CycleStage::ImageRendering => "image rendering",
            CycleStage::AudioRendering => "audio rendering",
            CycleStage::VideoAssembling => "video assembling",
            CycleStage::Publishing => "publishing",
            CycleStage::Recording => "recording",
            CycleStage::Aborted => "aborted",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BotStatus {
    pub stage: CycleStage,
    pub last_run: Option<DateTime<Local>>,
    pub last_outcome: Option<String>,
    pub cycles_completed: u64,
    pub cycles_failed: u64,
}

#[derive(Clone, Default)]
pub struct StatusHandle(Arc<RwLock<BotStatus>>);

impl StatusHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> BotStatus {
        self.0.read().await.clone()
    }

    pub async fn set_stage(&self, stage: CycleStage) {
        self.0.write().await.stage = stage;
    }

    pub async fn record_success(&self, started: DateTime<Local>, outcome: String) {
        let mut status = self.0.write().await;
        status.stage = CycleStage::Idle;
        status.last_run = Some(started);
        status.last_outcome = Some(outcome);
        status.cycles_completed += 1;
    }

    pub async fn record_failure(&self, started: DateTime<Local>, outcome: String) {
        let mut status = self.0.write().await;
        status.stage = CycleStage::Aborted;
        status.last_run = Some(started);
        status.last_outcome = Some(outcome);
        status.cycles_failed += 1;
    }
}
