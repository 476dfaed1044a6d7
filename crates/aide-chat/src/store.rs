//! Task persistence collaborator trait and implementations

use async_trait::async_trait;
use tokio::sync::Mutex;

use aide_api::{Error, NewSubtask, NewTask, Result, Subtask, Task, TaskClient};

/// The task/subtask persistence collaborator.
///
/// Both operations are independent create-and-return calls; there is no
/// batch or transactional variant, so the plan applier owns the best-effort
/// partial-failure policy.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, task: &NewTask) -> Result<Task>;
    async fn create_subtask(&self, parent_task_id: &str, subtask: &NewSubtask) -> Result<Subtask>;
}

/// HTTP-backed task store.
pub struct HttpTaskStore {
    client: TaskClient,
}

impl HttpTaskStore {
    pub fn new(client: TaskClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskStore for HttpTaskStore {
    async fn create_task(&self, task: &NewTask) -> Result<Task> {
        self.client.create_task(task).await
    }

    async fn create_subtask(&self, parent_task_id: &str, subtask: &NewSubtask) -> Result<Subtask> {
        self.client.create_subtask(parent_task_id, subtask).await
    }
}

#[derive(Default)]
struct MemoryInner {
    next_id: u64,
    tasks: Vec<Task>,
    subtasks: Vec<Subtask>,
}

/// In-memory task store used by tests and the CLI dry-run mode.
#[derive(Default)]
pub struct MemoryTaskStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all tasks created so far.
    pub async fn tasks(&self) -> Vec<Task> {
        self.inner.lock().await.tasks.clone()
    }

    /// Snapshot of all subtasks created so far.
    pub async fn subtasks(&self) -> Vec<Subtask> {
        self.inner.lock().await.subtasks.clone()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create_task(&self, task: &NewTask) -> Result<Task> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let record = Task {
            id: format!("task-{}", inner.next_id),
            title: task.title.clone(),
            priority: Some(task.priority.clone()),
            estimated_minutes: Some(task.estimated_minutes),
            status: Some(task.status.clone()),
            organization_id: Some(task.organization_id.clone()),
            created_at: Some(chrono::Utc::now()),
        };
        inner.tasks.push(record.clone());
        Ok(record)
    }

    async fn create_subtask(&self, parent_task_id: &str, subtask: &NewSubtask) -> Result<Subtask> {
        let mut inner = self.inner.lock().await;
        if !inner.tasks.iter().any(|t| t.id == parent_task_id) {
            return Err(Error::api(404, format!("no such task: {}", parent_task_id)));
        }
        inner.next_id += 1;
        let record = Subtask {
            id: format!("subtask-{}", inner.next_id),
            title: subtask.title.clone(),
            task_id: parent_task_id.to_string(),
            organization_id: Some(subtask.organization_id.clone()),
            project_id: subtask.project_id.clone(),
        };
        inner.subtasks.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_links_subtasks() {
        let store = MemoryTaskStore::new();
        let task = store
            .create_task(&NewTask::pending("T", "high", 60, "org-1"))
            .await
            .unwrap();
        let sub = store
            .create_subtask(
                &task.id,
                &NewSubtask {
                    title: "s1".into(),
                    organization_id: "org-1".into(),
                    project_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(sub.task_id, task.id);
        assert_eq!(store.tasks().await.len(), 1);
        assert_eq!(store.subtasks().await.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_rejects_unknown_parent() {
        let store = MemoryTaskStore::new();
        let err = store
            .create_subtask(
                "task-999",
                &NewSubtask {
                    title: "s".into(),
                    organization_id: "org-1".into(),
                    project_id: None,
                },
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
