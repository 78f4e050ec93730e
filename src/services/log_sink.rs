use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

// Durable append-only record store. All bytes of one record land
// contiguously; no ordering guarantee across concurrent writers.
#[async_trait]
pub trait AppendSink: Send + Sync {
    async fn append(&self, record: &str) -> io::Result<()>;
}

// Appends records to a text file, one open/write/flush cycle per record.
// The mutex serializes writers so records from different users' workers
// never interleave.
pub struct FileSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl AppendSink for FileSink {
    async fn append(&self, record: &str) -> io::Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(record.as_bytes()).await?;
        file.flush().await
    }
}

// In-memory sink for tests. Can be armed to fail the next append.
#[cfg(test)]
pub struct MemorySink {
    records: std::sync::Mutex<Vec<String>>,
    fail_next: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl MemorySink {
    pub fn new() -> Self {
        Self {
            records: std::sync::Mutex::new(Vec::new()),
            fail_next: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn fail_next_append(&self) {
        self.fail_next
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
#[async_trait]
impl AppendSink for MemorySink {
    async fn append(&self, record: &str) -> io::Result<()> {
        if self.fail_next.swap(false, std::sync::atomic::Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "sink unavailable"));
        }
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task_log.txt");
        let sink = FileSink::new(&path);

        sink.append("u1-task completed at-1\n").await.unwrap();
        sink.append("u2-task completed at-2\n").await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "u1-task completed at-1\nu2-task completed at-2\n");
    }

    #[tokio::test]
    async fn file_sink_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested_log.txt");
        assert!(!path.exists());

        let sink = FileSink::new(&path);
        sink.append("u1-task completed at-3\n").await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn memory_sink_failure_is_one_shot() {
        let sink = MemorySink::new();
        sink.fail_next_append();

        assert!(sink.append("first\n").await.is_err());
        assert!(sink.append("second\n").await.is_ok());
        assert_eq!(sink.lines(), vec!["second\n"]);
    }
}
