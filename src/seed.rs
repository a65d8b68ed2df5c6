use crate::model::{Status, Task, TaskList};

/// Fixed bootstrap collection, used only when the store holds no tasks.
/// Ids start at 1 so the first submitted task gets id 4.
pub fn initial_tasks() -> TaskList {
    TaskList::new(vec![
        Task {
            id: 1,
            title: "Plan the week".into(),
            description: "Collect everything that needs doing into the To Do column.".into(),
            status: Status::Todo,
        },
        Task {
            id: 2,
            title: "Review open pull requests".into(),
            description: String::new(),
            status: Status::Doing,
        },
        Task {
            id: 3,
            title: "Ship the release notes".into(),
            description: "Published and announced.".into(),
            status: Status::Done,
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_covers_every_column_with_unique_ids() {
        let tasks = initial_tasks();
        assert_eq!(tasks.len(), 3);
        let mut ids: Vec<u64> = tasks.iter().map(|t| t.id).collect();
        ids.dedup();
        assert_eq!(ids, vec![1, 2, 3]);
        let statuses: Vec<Status> = tasks.iter().map(|t| t.status.clone()).collect();
        assert_eq!(statuses, vec![Status::Todo, Status::Doing, Status::Done]);
    }
}
