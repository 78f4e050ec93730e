mod task;

pub use task::submit_task;
