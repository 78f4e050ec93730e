use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use thiserror::Error;

use crate::errors::ExecError;
use crate::executor::TaskExecutor;
use crate::models::{CompletionRecord, TaskJob, TaskStatus};

// Observes terminal job states. Bound exactly once per queue at
// creation; the worker never attaches observers on its own.
pub trait JobObserver: Send + Sync {
    fn on_completed(&self, job: &TaskJob, record: &CompletionRecord);
    fn on_failed(&self, job: &TaskJob, error: &ExecError);
}

// Default observer: surfaces terminal states to the operational log.
pub struct LogObserver;

impl JobObserver for LogObserver {
    fn on_completed(&self, job: &TaskJob, _record: &CompletionRecord) {
        tracing::info!("Job {} completed for user {}", job.job_id, job.user_id);
    }

    fn on_failed(&self, job: &TaskJob, error: &ExecError) {
        tracing::error!(
            "Job {} failed for user {}: {}",
            job.job_id,
            job.user_id,
            error
        );
    }
}

#[derive(Error, Debug)]
pub enum PushError {
    #[error("queue for user {user_id} is full ({capacity} pending)")]
    Full { user_id: String, capacity: usize },
}

// Idle: no worker; Draining: exactly one worker popping jobs.
struct QueueState {
    pending: VecDeque<TaskJob>,
    draining: bool,
    last_activity: Instant,
}

// FIFO work queue bound to one user. A worker is spawned only on the
// Idle -> Draining transition, and the flag flips back to Idle under the
// same lock acquisition that observed the empty queue, so a concurrent
// push either lands before the flip (this worker drains it) or after
// (a fresh worker is spawned). At most one worker per user, ever.
pub struct UserQueue {
    user_id: String,
    max_pending: usize,
    state: Mutex<QueueState>,
    executor: Arc<TaskExecutor>,
    observer: Arc<dyn JobObserver>,
}

impl UserQueue {
    pub fn new(
        user_id: &str,
        max_pending: usize,
        executor: Arc<TaskExecutor>,
        observer: Arc<dyn JobObserver>,
    ) -> Arc<Self> {
        Arc::new(Self {
            user_id: user_id.to_string(),
            max_pending,
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                draining: false,
                last_activity: Instant::now(),
            }),
            executor,
            observer,
        })
    }

    #[allow(dead_code)]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    // Appends to the tail and starts a worker if none is active.
    pub fn push(self: &Arc<Self>, job: TaskJob) -> Result<(), PushError> {
        let start_worker = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

            if state.pending.len() >= self.max_pending {
                return Err(PushError::Full {
                    user_id: self.user_id.clone(),
                    capacity: self.max_pending,
                });
            }

            state.pending.push_back(job);
            state.last_activity = Instant::now();

            if state.draining {
                false
            } else {
                state.draining = true;
                true
            }
        };

        if start_worker {
            let queue = Arc::clone(self);
            tokio::spawn(async move {
                queue.drain().await;
            });
        }

        Ok(())
    }

    // Worker loop: drains the queue head-first, one job at a time.
    // A failed job is reported and discarded; the loop continues.
    async fn drain(self: Arc<Self>) {
        loop {
            let mut job = {
                let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
                state.last_activity = Instant::now();
                match state.pending.pop_front() {
                    Some(job) => job,
                    None => {
                        state.draining = false;
                        return;
                    }
                }
            };

            job.status = TaskStatus::Running;
            match self.executor.run(&job.user_id).await {
                Ok(record) => {
                    job.status = TaskStatus::Completed;
                    self.observer.on_completed(&job, &record);
                }
                Err(err) => {
                    job.status = TaskStatus::Failed;
                    tracing::error!(
                        "Error processing job {} for user {}: {}",
                        job.job_id,
                        job.user_id,
                        err
                    );
                    self.observer.on_failed(&job, &err);
                }
            }
        }
    }

    // Some(last activity) when the queue is Idle with nothing pending,
    // None while a worker is active. Feeds the registry's eviction sweep.
    pub fn idle_since(&self) -> Option<Instant> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !state.draining && state.pending.is_empty() {
            Some(state.last_activity)
        } else {
            None
        }
    }

    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pending
            .len()
    }
}
