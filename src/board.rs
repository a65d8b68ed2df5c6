use crate::model::{ColumnSet, TaskDraft, TaskList};
use crate::seed;
use crate::storage::{load_tasks, save_tasks, StoreLocation};
use anyhow::{Context, Result};

/// The live board: the canonical task collection bound to its store slot.
/// Construction is the only initialization path, so load-or-seed runs at
/// most once per `Board` and can never double-wire anything.
pub struct Board {
    tasks: TaskList,
    location: StoreLocation,
}

impl Board {
    /// Loads the collection from the slot; on an empty or unreadable slot,
    /// replaces it with the bootstrap seed and persists immediately. A
    /// later init never re-seeds while any task exists.
    pub fn init(location: StoreLocation) -> Result<Self> {
        let mut tasks = load_tasks(&location);
        if tasks.is_empty() {
            tasks = seed::initial_tasks();
            save_tasks(&location, &tasks).context("seeding the task board")?;
        }
        Ok(Board { tasks, location })
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Projects the collection into its status columns and persists it.
    /// The two are coupled: every projection handed out is backed by the
    /// same bytes on disk, so repeated calls change nothing.
    pub fn render(&mut self) -> Result<ColumnSet> {
        save_tasks(&self.location, &self.tasks)?;
        Ok(ColumnSet::project(&self.tasks))
    }

    /// The add-task flow: validate, append with a fresh id, persist and
    /// re-project. On a validation error nothing is mutated or written.
    pub fn submit(&mut self, draft: &TaskDraft) -> Result<u64> {
        let id = self.tasks.append(draft)?;
        self.render()?;
        Ok(id)
    }

    /// The detail-dialog save path: replaces an existing task's fields and
    /// persists. Closing the dialog without saving goes nowhere near this.
    pub fn apply_edit(&mut self, id: u64, draft: &TaskDraft) -> Result<()> {
        self.tasks.apply(id, draft)?;
        self.render()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use std::fs;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> StoreLocation {
        StoreLocation::at(dir.path().join("board.yml"))
    }

    fn draft(title: &str, description: &str, status: Status) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: description.to_string(),
            status,
        }
    }

    #[test]
    fn init_on_empty_store_persists_the_seed() {
        let dir = TempDir::new().unwrap();
        let location = store_in(&dir);
        let board = Board::init(location.clone()).unwrap();
        assert_eq!(board.tasks(), &seed::initial_tasks());
        assert_eq!(load_tasks(&location), seed::initial_tasks());
    }

    #[test]
    fn init_never_reseeds_once_tasks_exist() {
        let dir = TempDir::new().unwrap();
        let location = store_in(&dir);
        let mut board = Board::init(location.clone()).unwrap();
        board
            .submit(&draft("extra", "", Status::Todo))
            .unwrap();

        let again = Board::init(location).unwrap();
        assert_eq!(again.tasks().len(), 4);
        assert!(again.tasks().iter().any(|t| t.title == "extra"));
    }

    #[test]
    fn init_keeps_tasks_whose_status_matches_no_column() {
        let dir = TempDir::new().unwrap();
        let location = store_in(&dir);
        let yaml = "\
- id: 10
  title: keep
  description: ''
  status: todo
- id: 11
  title: odd one
  description: ''
  status: blocked
";
        fs::write(&location.path, yaml).unwrap();

        let mut board = Board::init(location.clone()).unwrap();
        assert_eq!(board.tasks().len(), 2);
        assert!(board.tasks().get(10).is_some());

        // Skipped from display, still persisted.
        let columns = board.render().unwrap();
        let shown: usize = columns.columns().iter().map(|c| c.task_ids.len()).sum();
        assert_eq!(shown, 1);
        let reloaded = load_tasks(&location);
        assert_eq!(
            reloaded.get(11).unwrap().status,
            Status::Unknown("blocked".into())
        );

        // Fresh ids account for the hidden task too.
        let id = board.submit(&draft("new", "", Status::Todo)).unwrap();
        assert_eq!(id, 12);
    }

    #[test]
    fn render_twice_yields_equal_columns_and_identical_bytes() {
        let dir = TempDir::new().unwrap();
        let location = store_in(&dir);
        let mut board = Board::init(location.clone()).unwrap();

        let first = board.render().unwrap();
        let first_bytes = fs::read(&location.path).unwrap();
        let second = board.render().unwrap();
        let second_bytes = fs::read(&location.path).unwrap();

        assert_eq!(first, second);
        assert_eq!(first_bytes, second_bytes);
    }

    #[test]
    fn submit_grows_the_collection_by_one_and_keeps_prior_order() {
        let dir = TempDir::new().unwrap();
        let mut board = Board::init(store_in(&dir)).unwrap();
        let before: Vec<(u64, String)> = board
            .tasks()
            .iter()
            .map(|t| (t.id, t.title.clone()))
            .collect();

        let id = board
            .submit(&draft("New work", "details", Status::Todo))
            .unwrap();

        assert_eq!(board.tasks().len(), before.len() + 1);
        let after: Vec<(u64, String)> = board
            .tasks()
            .iter()
            .map(|t| (t.id, t.title.clone()))
            .collect();
        assert_eq!(&after[..before.len()], &before[..]);
        assert_eq!(after.last().map(|(i, _)| *i), Some(id));
    }

    #[test]
    fn rejected_submission_leaves_store_bytes_untouched() {
        let dir = TempDir::new().unwrap();
        let location = store_in(&dir);
        let mut board = Board::init(location.clone()).unwrap();
        let before = fs::read(&location.path).unwrap();

        let err = board.submit(&draft("   ", "ignored", Status::Doing));
        assert!(err.is_err());
        assert_eq!(board.tasks().len(), 3);
        assert_eq!(fs::read(&location.path).unwrap(), before);
    }

    #[test]
    fn apply_edit_persists_the_changed_task() {
        let dir = TempDir::new().unwrap();
        let location = store_in(&dir);
        let mut board = Board::init(location.clone()).unwrap();

        board
            .apply_edit(1, &draft("Plan the month", "longer horizon", Status::Doing))
            .unwrap();

        let reloaded = load_tasks(&location);
        let task = reloaded.get(1).unwrap();
        assert_eq!(task.title, "Plan the month");
        assert_eq!(task.status, Status::Doing);
    }

    #[test]
    fn first_run_scenario_seeds_then_appends_into_doing() {
        let dir = TempDir::new().unwrap();
        let location = store_in(&dir);
        let mut board = Board::init(location.clone()).unwrap();

        let columns = board.render().unwrap();
        assert_eq!(columns.column(Status::Todo).task_ids, vec![1]);
        assert_eq!(columns.column(Status::Doing).task_ids, vec![2]);
        assert_eq!(columns.column(Status::Done).task_ids, vec![3]);

        let id = board
            .submit(&draft("Write tests", "", Status::Doing))
            .unwrap();
        assert_eq!(id, 4);
        assert_eq!(board.tasks().len(), 4);

        let columns = board.render().unwrap();
        assert_eq!(columns.column(Status::Doing).task_ids, vec![2, 4]);
        assert_eq!(load_tasks(&location), *board.tasks());
    }
}
