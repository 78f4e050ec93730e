use std::sync::Arc;

use crate::limiter::RateLimiter;
use crate::queue::QueueRegistry;

// Shared between handlers; cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<RateLimiter>,
    pub registry: Arc<QueueRegistry>,
}
