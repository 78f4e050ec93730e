use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    pub user_id: Option<String>,
}
