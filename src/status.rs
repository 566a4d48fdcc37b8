//! Read-only status of a running benchmark.
//!
//! The driver runs one workload made of sequential stages. [`Status`] is updated by the driver
//! as stages start and finish. [`Status::snapshot`] hands out a plain copy that can be rendered
//! for an operator. It only carries identifiers and state labels, never generator internals.
//!
//! The JSON rendering looks like:
//!
//! ```json
//! {
//!   "drivers": [{ "id": "driver1", "url": "local" }],
//!   "workloads": [{
//!     "id": "w1",
//!     "status": "processing",
//!     "stages": [
//!       { "id": "w1-s1", "name": "objects", "status": "completed" },
//!       { "id": "w1-s2", "name": "sizes", "status": "running" }
//!     ]
//!   }]
//! }
//! ```

use parking_lot::RwLock;
use serde::Serialize;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StageState {
    Waiting,
    Running,
    Completed,
    Failed,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadState {
    Queued,
    Processing,
    Finished,
    Failed,
}

impl WorkloadState {
    fn of(stages: &[StageInfo]) -> Self {
        if stages.iter().any(|s| s.status == StageState::Failed) {
            WorkloadState::Failed
        } else if stages.iter().all(|s| s.status == StageState::Completed) {
            WorkloadState::Finished
        } else if stages.iter().all(|s| s.status == StageState::Waiting) {
            WorkloadState::Queued
        } else {
            WorkloadState::Processing
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DriverInfo {
    pub id: String,
    pub url: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct StageInfo {
    pub id: String,
    pub name: String,
    pub status: StageState,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct WorkloadInfo {
    pub id: String,
    pub status: WorkloadState,
    pub stages: Vec<StageInfo>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct StatusSnapshot {
    pub drivers: Vec<DriverInfo>,
    pub workloads: Vec<WorkloadInfo>,
}

impl StatusSnapshot {
    pub fn to_json(&self) -> String {
        // all fields are strings and enums, serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Live status of one driver running one workload.
#[derive(Debug)]
pub struct Status {
    driver: DriverInfo,
    workload: String,
    stages: RwLock<Vec<StageInfo>>,
}

impl Status {
    pub fn new(workload: &str, stage_names: &[&str]) -> Self {
        let stages = stage_names
            .iter()
            .enumerate()
            .map(|(i, name)| StageInfo {
                id: format!("{}-s{}", workload, i + 1),
                name: name.to_string(),
                status: StageState::Waiting,
            })
            .collect();
        Self {
            driver: DriverInfo {
                id: "driver1".to_string(),
                url: "local".to_string(),
            },
            workload: workload.to_string(),
            stages: RwLock::new(stages),
        }
    }

    pub(crate) fn set(&self, stage: usize, state: StageState) {
        let mut stages = self.stages.write();
        if let Some(s) = stages.get_mut(stage) {
            s.status = state;
        }
    }

    pub fn stage(&self, stage: usize) -> Option<StageState> {
        self.stages.read().get(stage).map(|s| s.status)
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let stages = self.stages.read().clone();
        let workload = WorkloadInfo {
            id: self.workload.clone(),
            status: WorkloadState::of(&stages),
            stages,
        };
        StatusSnapshot {
            drivers: vec![self.driver.clone()],
            workloads: vec![workload],
        }
    }
}
