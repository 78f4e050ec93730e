use std::sync::Arc;

use crate::errors::ExecResult;
use crate::models::CompletionRecord;
use crate::services::AppendSink;

// Runs one task for one user: stamp a completion record and append it
// to the durable log. Retry policy, if any, belongs to the caller.
pub struct TaskExecutor {
    sink: Arc<dyn AppendSink>,
}

impl TaskExecutor {
    pub fn new(sink: Arc<dyn AppendSink>) -> Self {
        Self { sink }
    }

    pub async fn run(&self, user_id: &str) -> ExecResult<CompletionRecord> {
        let record = CompletionRecord::new(user_id);
        self.sink.append(&record.log_line()).await?;

        tracing::debug!("Task completed for user {}", user_id);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemorySink;

    #[tokio::test]
    async fn run_appends_one_record() {
        let sink = Arc::new(MemorySink::new());
        let executor = TaskExecutor::new(sink.clone());

        let record = executor.run("u2").await.unwrap();

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], record.log_line());
        assert!(lines[0].starts_with("u2-task completed at-"));
    }

    #[tokio::test]
    async fn sink_failure_propagates_without_appending() {
        let sink = Arc::new(MemorySink::new());
        let executor = TaskExecutor::new(sink.clone());

        sink.fail_next_append();
        assert!(executor.run("u1").await.is_err());
        assert!(sink.lines().is_empty());
    }
}
