use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Lifecycle of a queued task: Pending until its worker picks it up,
// then Running, then exactly one of Completed or Failed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TaskJob {
    pub job_id: Uuid,
    pub user_id: String,
    pub enqueued_at: DateTime<Utc>,
    pub status: TaskStatus,
}

impl TaskJob {
    pub fn new(user_id: &str) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            enqueued_at: Utc::now(),
            status: TaskStatus::Pending,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CompletionRecord {
    pub user_id: String,
    pub completed_at: DateTime<Utc>,
}

impl CompletionRecord {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            completed_at: Utc::now(),
        }
    }

    // One line per completed task in the append log.
    pub fn log_line(&self) -> String {
        format!(
            "{}-task completed at-{}\n",
            self.user_id,
            self.completed_at.timestamp_millis()
        )
    }
}
