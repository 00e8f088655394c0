//! JSONL record storage
//!
//! Each catalog file (`courses.jsonl`, `rules.jsonl`, `students.jsonl`) holds
//! one JSON object per line. Line order is meaningful: it is the registry
//! order for courses and the insertion order for rules.
//! Uses file locking for concurrent access safety.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Store for one record type in JSONL format
pub struct JsonlStore<T> {
    path: PathBuf,
    _record: PhantomData<T>,
}

impl<T> JsonlStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a new store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all records in file order
    pub fn read_all(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open store: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .with_context(|| format!("Failed to acquire read lock on {}", self.path.display()))?;

        let reader = BufReader::new(&file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let record: T = serde_json::from_str(&line).with_context(|| {
                format!(
                    "Failed to parse record at {}:{}",
                    self.path.display(),
                    line_num + 1
                )
            })?;

            records.push(record);
        }

        // Lock is released when file is dropped
        Ok(records)
    }

    /// Writes all records to the store (full rewrite, order preserved)
    pub fn write_all<'a>(&self, records: impl IntoIterator<Item = &'a T>) -> Result<()>
    where
        T: 'a,
    {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        // Write to temp file first
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .with_context(|| format!("Failed to acquire write lock on {}", temp_path.display()))?;

            let mut writer = BufWriter::new(&file);

            for record in records {
                let line = serde_json::to_string(record).context("Failed to serialize record")?;
                writeln!(writer, "{}", line).context("Failed to write record")?;
            }

            writer.flush().context("Failed to flush store")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    /// Appends a single record without rewriting the file
    pub fn append(&self, record: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open store: {}", self.path.display()))?;

        file.lock_exclusive()
            .with_context(|| format!("Failed to acquire write lock on {}", self.path.display()))?;

        let mut writer = BufWriter::new(&file);
        let line = serde_json::to_string(record).context("Failed to serialize record")?;
        writeln!(writer, "{}", line).context("Failed to write record")?;

        writer.flush().context("Failed to flush store")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Course;
    use tempfile::TempDir;

    fn make_course(n: u32) -> Course {
        Course::new(format!("C{}", n), format!("Course {}", n))
    }

    #[test]
    fn read_empty_store() {
        let dir = TempDir::new().unwrap();
        let store: JsonlStore<Course> = JsonlStore::new(dir.path().join("courses.jsonl"));

        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn write_and_read_preserves_order() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(dir.path().join("courses.jsonl"));

        let courses: Vec<_> = (1..=5).rev().map(make_course).collect();
        store.write_all(&courses).unwrap();

        let loaded: Vec<Course> = store.read_all().unwrap();
        assert_eq!(loaded, courses);
    }

    #[test]
    fn append_record() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(dir.path().join("courses.jsonl"));

        store.append(&make_course(1)).unwrap();
        store.append(&make_course(2)).unwrap();

        let loaded: Vec<Course> = store.read_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].code, "C2");
    }

    #[test]
    fn skips_blank_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("courses.jsonl");
        let line = serde_json::to_string(&make_course(1)).unwrap();
        fs::write(&path, format!("\n{}\n\n", line)).unwrap();

        let store: JsonlStore<Course> = JsonlStore::new(path);
        assert_eq!(store.read_all().unwrap().len(), 1);
    }

    #[test]
    fn malformed_line_reports_location() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("courses.jsonl");
        fs::write(&path, "{not json}\n").unwrap();

        let store: JsonlStore<Course> = JsonlStore::new(path);
        let err = store.read_all().unwrap_err();
        assert!(format!("{:#}", err).contains("courses.jsonl:1"));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(dir.path().join("nested").join("dir").join("courses.jsonl"));

        store.append(&make_course(1)).unwrap();

        assert!(store.path().exists());
    }

    #[test]
    fn atomic_write() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(dir.path().join("courses.jsonl"));

        store.write_all(&[make_course(1)]).unwrap();

        let temp_path = store.path().with_extension("jsonl.tmp");
        assert!(!temp_path.exists());
    }
}
