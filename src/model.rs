use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column assignment for a task. The three known buckets are fixed; a
/// status some other writer left in the store is carried as `Unknown` so
/// the task survives load/save even though no column displays it. User
/// input stays strict: `FromStr` only accepts the three known names.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Todo,
    Doing,
    Done,
    Unknown(String),
}

pub const STATUSES: [Status; 3] = [Status::Todo, Status::Doing, Status::Done];

impl Status {
    pub fn id(&self) -> &str {
        match self {
            Status::Todo => "todo",
            Status::Doing => "doing",
            Status::Done => "done",
            Status::Unknown(other) => other,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Status::Todo => "To Do",
            Status::Doing => "Doing",
            Status::Done => "Done",
            Status::Unknown(other) => other,
        }
    }

    pub fn next(&self) -> Status {
        match self {
            Status::Todo => Status::Doing,
            Status::Doing => Status::Done,
            Status::Done => Status::Todo,
            Status::Unknown(_) => Status::Todo,
        }
    }

    pub fn prev(&self) -> Status {
        match self {
            Status::Todo => Status::Done,
            Status::Doing => Status::Todo,
            Status::Done => Status::Doing,
            Status::Unknown(_) => Status::Done,
        }
    }
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        match s.as_str() {
            "todo" => Status::Todo,
            "doing" => Status::Doing,
            "done" => Status::Done,
            _ => Status::Unknown(s),
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.id().to_string()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Status {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "todo" => Ok(Status::Todo),
            "doing" => Ok(Status::Doing),
            "done" => Ok(Status::Done),
            other => Err(TaskError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub status: Status,
}

/// Unvalidated task input from a form or the CLI. Text fields are trimmed
/// during validation; a trimmed-empty title rejects the whole draft.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: Status,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TaskError {
    #[error("a task title is required")]
    EmptyTitle,
    #[error("task not found: {0}")]
    NotFound(u64),
    #[error("unknown status: {0} (expected todo, doing, or done)")]
    UnknownStatus(String),
}

/// The canonical ordered task collection. Insertion order is display order
/// within a status column; ids are unique and never reassigned.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        TaskList { tasks }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Next fresh id: one past the largest id in the collection. Monotonic
    /// as long as ids are never reassigned, which they are not.
    pub fn next_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Validates the draft and appends it with a fresh id. Existing tasks
    /// keep their order and ids; on error nothing changes.
    pub fn append(&mut self, draft: &TaskDraft) -> Result<u64, TaskError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        let id = self.next_id();
        self.tasks.push(Task {
            id,
            title: title.to_string(),
            description: draft.description.trim().to_string(),
            status: draft.status.clone(),
        });
        Ok(id)
    }

    /// Replaces title/description/status of an existing task with the
    /// validated draft. The id is immutable.
    pub fn apply(&mut self, id: u64, draft: &TaskDraft) -> Result<(), TaskError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))?;
        task.title = title.to_string();
        task.description = draft.description.trim().to_string();
        task.status = draft.status.clone();
        Ok(())
    }
}

/// One displayed status column: the bucket's status plus the ids of its
/// tasks in collection order. The id is the stable lookup key; the full
/// record is fetched from the `TaskList` when needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub status: Status,
    pub task_ids: Vec<u64>,
}

/// Typed mapping from the three known statuses to their column buckets,
/// resolved once per projection instead of looked up per task. A task
/// whose status matches no bucket is left out of the display; it stays in
/// the collection and keeps being persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSet {
    columns: [Column; 3],
}

impl ColumnSet {
    pub fn project(tasks: &TaskList) -> Self {
        let mut columns = STATUSES.map(|status| Column {
            status,
            task_ids: Vec::new(),
        });
        for task in tasks.iter() {
            if let Some(column) = columns.iter_mut().find(|c| c.status == task.status) {
                column.task_ids.push(task.id);
            }
        }
        ColumnSet { columns }
    }

    pub fn columns(&self) -> &[Column; 3] {
        &self.columns
    }

    pub fn column(&self, status: Status) -> &Column {
        // STATUSES covers every displayed bucket, so the find succeeds for
        // anything a column was built from.
        self.columns
            .iter()
            .find(|c| c.status == status)
            .unwrap_or(&self.columns[0])
    }
}
