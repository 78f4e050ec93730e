use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use uuid::Uuid;

use crate::config::QueueConfig;
use crate::errors::{AppError, AppResult};
use crate::executor::TaskExecutor;
use crate::models::TaskJob;
use crate::queue::user_queue::{JobObserver, UserQueue};

// Process-wide map from user id to that user's queue. Queues are
// created lazily under the map lock, so concurrent first requests for
// one user always land on a single instance. The same lock covers
// enqueue and eviction: an evicted queue instance can never receive
// another job, so at most one live queue exists per user at any time.
pub struct QueueRegistry {
    queues: Mutex<HashMap<String, Arc<UserQueue>>>,
    executor: Arc<TaskExecutor>,
    observer: Arc<dyn JobObserver>,
    config: QueueConfig,
}

impl QueueRegistry {
    pub fn new(
        executor: Arc<TaskExecutor>,
        observer: Arc<dyn JobObserver>,
        config: QueueConfig,
    ) -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            executor,
            observer,
            config,
        }
    }

    #[allow(dead_code)]
    pub fn get_or_create(&self, user_id: &str) -> Arc<UserQueue> {
        let mut queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(Self::entry(&mut queues, user_id, &self.executor, &self.observer, &self.config))
    }

    // Creates the job and places it on the user's queue, creating the
    // queue if absent. Runs entirely under the map lock so the job is
    // accepted (or rejected) before the HTTP response is produced.
    pub fn enqueue(&self, user_id: &str) -> AppResult<Uuid> {
        let job = TaskJob::new(user_id);
        let job_id = job.job_id;

        let mut queues = self
            .queues
            .lock()
            .map_err(|_| AppError::Internal("queue registry lock poisoned".into()))?;
        let queue = Self::entry(&mut queues, user_id, &self.executor, &self.observer, &self.config);
        queue
            .push(job)
            .map_err(|e| AppError::Queue(e.to_string()))?;

        Ok(job_id)
    }

    fn entry<'a>(
        queues: &'a mut HashMap<String, Arc<UserQueue>>,
        user_id: &str,
        executor: &Arc<TaskExecutor>,
        observer: &Arc<dyn JobObserver>,
        config: &QueueConfig,
    ) -> &'a Arc<UserQueue> {
        queues.entry(user_id.to_string()).or_insert_with(|| {
            tracing::debug!("Creating queue for user {}", user_id);
            UserQueue::new(
                user_id,
                config.max_pending,
                Arc::clone(executor),
                Arc::clone(observer),
            )
        })
    }

    // Removes queues that have been Idle with nothing pending for longer
    // than the configured threshold. Holding the map lock here excludes
    // concurrent enqueues, so an evicted queue is unreachable for good;
    // the user's next request simply creates a fresh one.
    pub fn evict_idle(&self) {
        self.evict_idle_at(Instant::now());
    }

    fn evict_idle_at(&self, now: Instant) {
        let threshold = self.config.idle_evict();
        let mut queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        let before = queues.len();

        queues.retain(|_, queue| match queue.idle_since() {
            Some(since) => now.duration_since(since) < threshold,
            None => true,
        });

        let evicted = before - queues.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} idle user queues", evicted);
        }
    }

    #[allow(dead_code)]
    pub fn queue_count(&self) -> usize {
        self.queues
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    // Background loop keeping the queue map bounded.
    pub fn start_sweep_task(self: &Arc<Self>, interval: std::time::Duration) {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                registry.evict_idle();
            }
        });
    }
}
