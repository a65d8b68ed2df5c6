use crate::model::TaskList;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

/// The single slot holding the serialized task collection. There is exactly
/// one collection per slot, never partial records.
#[derive(Debug, Clone)]
pub struct StoreLocation {
    pub path: PathBuf,
}

impl StoreLocation {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        StoreLocation { path: path.into() }
    }
}

/// Resolves the store slot: an explicit path when given, otherwise the
/// fixed per-user data file.
pub fn locate_store(explicit: Option<PathBuf>) -> Result<StoreLocation> {
    if let Some(path) = explicit {
        return Ok(StoreLocation { path });
    }
    let dirs = ProjectDirs::from("", "", "taskdeck").context("locating data directory")?;
    Ok(StoreLocation {
        path: dirs.data_dir().join("board.yml"),
    })
}

/// Reads the persisted collection. Fails soft: a missing, unreadable, or
/// undecodable file yields the empty collection so first-run seeding can
/// take over. A record with an unrecognized status string is not a decode
/// failure; it carries through as `Status::Unknown`. Never mutates the
/// slot.
pub fn load_tasks(location: &StoreLocation) -> TaskList {
    let data = match fs::read_to_string(&location.path) {
        Ok(data) => data,
        Err(_) => return TaskList::default(),
    };
    serde_yaml::from_str(&data).unwrap_or_default()
}

/// Serializes the full collection and overwrites the slot in a single
/// write. Saving the same collection twice yields the same bytes.
pub fn save_tasks(location: &StoreLocation, tasks: &TaskList) -> Result<()> {
    if let Some(parent) = location.path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let serialized = serde_yaml::to_string(tasks).context("serializing task list")?;
    fs::write(&location.path, serialized)
        .with_context(|| format!("writing {:?}", location.path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Status, Task, TaskList};
    use std::fs;
    use tempfile::TempDir;

    fn sample_tasks() -> TaskList {
        TaskList::new(vec![
            Task {
                id: 1,
                title: "first".into(),
                description: "with text".into(),
                status: Status::Todo,
            },
            Task {
                id: 2,
                title: "second".into(),
                description: String::new(),
                status: Status::Done,
            },
        ])
    }

    #[test]
    fn save_then_load_round_trips_order_and_fields() {
        let dir = TempDir::new().unwrap();
        let location = StoreLocation::at(dir.path().join("board.yml"));
        let tasks = sample_tasks();
        save_tasks(&location, &tasks).unwrap();
        assert_eq!(load_tasks(&location), tasks);
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = TempDir::new().unwrap();
        let location = StoreLocation::at(dir.path().join("nope.yml"));
        assert!(load_tasks(&location).is_empty());
    }

    #[test]
    fn malformed_file_loads_as_empty() {
        let dir = TempDir::new().unwrap();
        let location = StoreLocation::at(dir.path().join("board.yml"));
        fs::write(&location.path, "- id: [not a task\n").unwrap();
        assert!(load_tasks(&location).is_empty());
    }

    #[test]
    fn wrong_shape_loads_as_empty() {
        let dir = TempDir::new().unwrap();
        let location = StoreLocation::at(dir.path().join("board.yml"));
        // Valid YAML, but not a task list.
        fs::write(&location.path, "name: something else\n").unwrap();
        assert!(load_tasks(&location).is_empty());
    }

    #[test]
    fn unrecognized_status_records_survive_load_and_save() {
        let dir = TempDir::new().unwrap();
        let location = StoreLocation::at(dir.path().join("board.yml"));
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

        let tasks = load_tasks(&location);
        assert_eq!(tasks.len(), 2);
        assert_eq!(
            tasks.get(11).unwrap().status,
            Status::Unknown("blocked".into())
        );

        save_tasks(&location, &tasks).unwrap();
        assert_eq!(load_tasks(&location), tasks);
    }

    #[test]
    fn saving_the_same_collection_twice_writes_identical_bytes() {
        let dir = TempDir::new().unwrap();
        let location = StoreLocation::at(dir.path().join("board.yml"));
        let tasks = sample_tasks();
        save_tasks(&location, &tasks).unwrap();
        let first = fs::read(&location.path).unwrap();
        save_tasks(&location, &tasks).unwrap();
        let second = fs::read(&location.path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let location = StoreLocation::at(dir.path().join("nested/deeper/board.yml"));
        save_tasks(&location, &sample_tasks()).unwrap();
        assert!(location.path.exists());
    }
}
