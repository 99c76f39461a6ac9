//! GAIA task model and task-batch resolution.
//!
//! Dataset acquisition from a remote hub is an external concern; this module
//! resolves batches from an already-materialized local JSONL snapshot (or an
//! in-memory set for stubs and tests) behind the `TaskSource` trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::DatasetError;

/// Valid GAIA difficulty levels.
pub const LEVELS: [u8; 3] = [1, 2, 3];

/// Dataset split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Validation,
    Test,
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Validation => write!(f, "validation"),
            Split::Test => write!(f, "test"),
        }
    }
}

impl FromStr for Split {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "validation" => Ok(Split::Validation),
            "test" => Ok(Split::Test),
            other => Err(DatasetError::InvalidSplit(other.to_string())),
        }
    }
}

/// One benchmark task. Immutable once loaded; identity is `task_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub task_id: String,
    /// The question to answer.
    pub question: String,
    /// Ground truth answer; hidden for the test split.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_truth: Option<String>,
    /// Difficulty level (1, 2, or 3).
    pub level: u8,
    /// Reference to an attached file, if the task has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_file: Option<String>,
}

fn default_task_indices() -> Vec<usize> {
    vec![0]
}

/// Configuration of one evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Difficulty level to evaluate.
    pub level: u8,
    /// Dataset split to draw tasks from.
    pub split: Split,
    /// Indices of the tasks to evaluate, in order.
    #[serde(default = "default_task_indices")]
    pub task_indices: Vec<usize>,
}

impl RunConfig {
    /// Validate the configuration before use.
    pub fn validate(&self) -> Result<(), DatasetError> {
        if !LEVELS.contains(&self.level) {
            return Err(DatasetError::InvalidLevel(self.level));
        }
        Ok(())
    }
}

/// Source of task batches for evaluation runs.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Resolve the tasks at `indices` for the given level and split, in
    /// order. Fails on invalid level/split or an out-of-range index.
    async fn get_task_batch(
        &self,
        level: u8,
        split: Split,
        indices: &[usize],
    ) -> Result<Vec<Task>, DatasetError>;
}

/// Task source reading a local JSONL snapshot: one task record per line in
/// `{data_dir}/{split}.jsonl`, filtered by level, addressed by index within
/// the filtered order.
pub struct JsonlTaskSource {
    data_dir: PathBuf,
}

impl JsonlTaskSource {
    /// Create a source rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn load_level(&self, level: u8, split: Split) -> Result<Vec<Task>, DatasetError> {
        if !LEVELS.contains(&level) {
            return Err(DatasetError::InvalidLevel(level));
        }

        let path = self.data_dir.join(format!("{split}.jsonl"));
        let raw = std::fs::read_to_string(&path)?;

        let mut tasks = Vec::new();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let task: Task = serde_json::from_str(line)?;
            if task.level == level {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }
}

#[async_trait]
impl TaskSource for JsonlTaskSource {
    async fn get_task_batch(
        &self,
        level: u8,
        split: Split,
        indices: &[usize],
    ) -> Result<Vec<Task>, DatasetError> {
        let tasks = self.load_level(level, split)?;
        pick_indices(&tasks, indices)
    }
}

/// Fixed in-memory task source, used by stubs and tests.
pub struct InMemoryTaskSource {
    tasks: Vec<Task>,
}

impl InMemoryTaskSource {
    /// Create a source over a fixed task list. Level/split filtering applies
    /// to the level field only; the split is accepted as-is.
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

#[async_trait]
impl TaskSource for InMemoryTaskSource {
    async fn get_task_batch(
        &self,
        level: u8,
        _split: Split,
        indices: &[usize],
    ) -> Result<Vec<Task>, DatasetError> {
        if !LEVELS.contains(&level) {
            return Err(DatasetError::InvalidLevel(level));
        }
        let tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|task| task.level == level)
            .cloned()
            .collect();
        pick_indices(&tasks, indices)
    }
}

fn pick_indices(tasks: &[Task], indices: &[usize]) -> Result<Vec<Task>, DatasetError> {
    indices
        .iter()
        .map(|&index| {
            tasks
                .get(index)
                .cloned()
                .ok_or(DatasetError::IndexOutOfRange {
                    index,
                    len: tasks.len(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_task(id: &str, level: u8) -> Task {
        Task {
            task_id: id.to_string(),
            question: format!("Question {id}"),
            ground_truth: Some("42".to_string()),
            level,
            attached_file: None,
        }
    }

    #[test]
    fn test_split_round_trip() {
        assert_eq!("validation".parse::<Split>().unwrap(), Split::Validation);
        assert_eq!("test".parse::<Split>().unwrap(), Split::Test);
        assert!(matches!(
            "train".parse::<Split>(),
            Err(DatasetError::InvalidSplit(_))
        ));
        assert_eq!(Split::Validation.to_string(), "validation");
        assert_eq!(
            serde_json::to_value(Split::Test).unwrap(),
            serde_json::json!("test")
        );
    }

    #[test]
    fn test_run_config_validation() {
        let config = RunConfig {
            level: 1,
            split: Split::Validation,
            task_indices: vec![0],
        };
        assert!(config.validate().is_ok());

        let config = RunConfig {
            level: 4,
            split: Split::Validation,
            task_indices: vec![0],
        };
        assert!(matches!(
            config.validate(),
            Err(DatasetError::InvalidLevel(4))
        ));
    }

    #[test]
    fn test_run_config_default_indices() {
        let config: RunConfig =
            serde_json::from_str(r#"{"level": 1, "split": "validation"}"#).unwrap();
        assert_eq!(config.task_indices, vec![0]);
    }

    #[tokio::test]
    async fn test_in_memory_batch_filters_by_level() {
        let source = InMemoryTaskSource::new(vec![
            sample_task("a", 1),
            sample_task("b", 2),
            sample_task("c", 1),
        ]);

        let batch = source
            .get_task_batch(1, Split::Validation, &[1, 0])
            .await
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].task_id, "c");
        assert_eq!(batch[1].task_id, "a");
    }

    #[tokio::test]
    async fn test_in_memory_index_out_of_range() {
        let source = InMemoryTaskSource::new(vec![sample_task("a", 1)]);
        let err = source
            .get_task_batch(1, Split::Validation, &[3])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DatasetError::IndexOutOfRange { index: 3, len: 1 }
        ));
    }

    #[tokio::test]
    async fn test_in_memory_invalid_level() {
        let source = InMemoryTaskSource::new(vec![sample_task("a", 1)]);
        let err = source
            .get_task_batch(0, Split::Validation, &[0])
            .await
            .unwrap_err();
        assert!(matches!(err, DatasetError::InvalidLevel(0)));
    }

    #[tokio::test]
    async fn test_jsonl_source_reads_split_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("validation.jsonl");
        let mut file = std::fs::File::create(&path).expect("create file");
        writeln!(
            file,
            r#"{{"task_id": "t1", "question": "Q1", "ground_truth": "a", "level": 1}}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"task_id": "t2", "question": "Q2", "level": 2}}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"task_id": "t3", "question": "Q3", "ground_truth": "c", "level": 1}}"#
        )
        .unwrap();

        let source = JsonlTaskSource::new(dir.path());
        let batch = source
            .get_task_batch(1, Split::Validation, &[0, 1])
            .await
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].task_id, "t1");
        assert_eq!(batch[1].task_id, "t3");
        assert_eq!(batch[1].ground_truth.as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn test_jsonl_source_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = JsonlTaskSource::new(dir.path());
        let err = source
            .get_task_batch(1, Split::Test, &[0])
            .await
            .unwrap_err();
        assert!(matches!(err, DatasetError::Io(_)));
    }
}
