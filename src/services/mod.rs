mod log_sink;

pub use log_sink::{AppendSink, FileSink};

#[cfg(test)]
pub use log_sink::MemorySink;
