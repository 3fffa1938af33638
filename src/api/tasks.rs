//! Customer tasks and the task board.
//!
//! Moving a card on the board is the one place the console updates local
//! state before the backend confirms: the move is applied immediately and,
//! if the status change is rejected, the board is reloaded from the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::QueryString;
use crate::gateway::{ApiClient, GatewayResult, Method};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Column order on the board
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown task status: {}", s))
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub assigned_to_name: Option<String>,
    #[serde(default)]
    pub customer_id: Option<u64>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub assigned_to_name: String,
    pub customer_id: u64,
    pub due_date: Option<DateTime<Utc>>,
}

/// Active tasks of one customer, grouped by status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TaskBoard {
    #[serde(default)]
    pub pending: Vec<Task>,
    #[serde(default)]
    pub in_progress: Vec<Task>,
    #[serde(default)]
    pub completed: Vec<Task>,
    #[serde(default)]
    pub cancelled: Vec<Task>,
}

impl TaskBoard {
    pub fn column(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Pending => &self.pending,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Completed => &self.completed,
            TaskStatus::Cancelled => &self.cancelled,
        }
    }

    fn column_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::Pending => &mut self.pending,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Completed => &mut self.completed,
            TaskStatus::Cancelled => &mut self.cancelled,
        }
    }

    pub fn len(&self) -> usize {
        TaskStatus::ALL.iter().map(|s| self.column(*s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move the card at `from` to `to` locally. The destination index is
    /// clamped to the column length. Returns the moved task's id, or `None`
    /// if there is no card at `from`.
    pub fn apply_move(
        &mut self,
        from: (TaskStatus, usize),
        to: (TaskStatus, usize),
    ) -> Option<u64> {
        let source = self.column_mut(from.0);
        if from.1 >= source.len() {
            return None;
        }
        let mut task = source.remove(from.1);
        task.status = to.0;
        let id = task.id;

        let dest = self.column_mut(to.0);
        let index = to.1.min(dest.len());
        dest.insert(index, task);
        Some(id)
    }
}

pub async fn active_board(client: &ApiClient, customer_id: u64) -> GatewayResult<TaskBoard> {
    let endpoint = QueryString::new()
        .param("customerId", customer_id)
        .append_to("tasks/active");
    client
        .get::<Option<TaskBoard>>(&endpoint)
        .await
        .map(Option::unwrap_or_default)
}

pub async fn get(client: &ApiClient, id: u64) -> GatewayResult<Task> {
    client.get(&format!("tasks/{}", id)).await
}

pub async fn create(client: &ApiClient, form: &TaskForm) -> GatewayResult<Option<Task>> {
    client.send_json("tasks", Method::Post, form).await
}

pub async fn update(client: &ApiClient, id: u64, form: &TaskForm) -> GatewayResult<Option<Task>> {
    client.send_json(&format!("tasks/{}", id), Method::Put, form).await
}

pub async fn soft_delete(client: &ApiClient, id: u64) -> GatewayResult<()> {
    client
        .call(&format!("tasks/soft-delete/{}", id), Method::Patch)
        .await
}

pub async fn set_status(client: &ApiClient, id: u64, status: TaskStatus) -> GatewayResult<()> {
    let endpoint = QueryString::new()
        .param("status", status)
        .append_to(&format!("tasks/{}/status", id));
    client.call(&endpoint, Method::Patch).await
}

/// Drag a card between (or within) columns.
///
/// The board is updated first, then the status change is sent. When the
/// backend rejects it, the board is replaced by a fresh copy from the
/// backend (left as moved if that reload fails too) and the rejection is
/// returned.
pub async fn move_task(
    client: &ApiClient,
    board: &mut TaskBoard,
    customer_id: u64,
    from: (TaskStatus, usize),
    to: (TaskStatus, usize),
) -> GatewayResult<()> {
    if from == to {
        return Ok(());
    }
    let Some(task_id) = board.apply_move(from, to) else {
        return Ok(());
    };

    match set_status(client, task_id, to.0).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::warn!(task_id, error = %e, "Status change rejected, reloading board");
            match active_board(client, customer_id).await {
                Ok(fresh) => *board = fresh,
                Err(reload) => tracing::warn!(error = %reload, "Board reload failed"),
            }
            Err(e)
        }
    }
}
