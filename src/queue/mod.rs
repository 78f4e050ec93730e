mod registry;
mod user_queue;

pub use registry::QueueRegistry;
pub use user_queue::{JobObserver, LogObserver, PushError, UserQueue};
