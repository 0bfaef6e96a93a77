//! The plain-text data file: one item per line.

use std::fs;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, TodoError};
use crate::list::TodoList;

pub const DEFAULT_TODO_FILENAME: &str = "todo.txt";

#[derive(Debug, Clone)]
pub struct TodoStore {
    path: PathBuf,
}

impl TodoStore {
    pub fn new(path: impl Into<PathBuf>) -> TodoStore {
        TodoStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole list. A missing file is an empty list.
    pub fn load(&self) -> Result<TodoList> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "todo file missing, starting empty");
                return Ok(TodoList::new());
            }
            Err(e) => return Err(TodoError::io("open", &self.path, e)),
        };
        let lines = BufReader::new(file)
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| TodoError::io("read", &self.path, e))?;
        let list = TodoList::from_lines(lines);
        debug!(path = %self.path.display(), items = list.len(), "loaded todo file");
        Ok(list)
    }

    /// Rewrites the whole file. The new contents land in a sibling temp
    /// file first and are renamed over the old file.
    pub fn save(&self, list: &TodoList) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| TodoError::io("create directory", &dir, e))?;

        let mut tmp =
            NamedTempFile::new_in(&dir).map_err(|e| TodoError::io("create temp file in", &dir, e))?;
        for item in list.iter() {
            writeln!(tmp, "{}", item).map_err(|e| TodoError::io("write", tmp.path(), e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| TodoError::io("sync", tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| TodoError::io("replace", &self.path, e.error))?;
        debug!(path = %self.path.display(), items = list.len(), "saved todo file");
        Ok(())
    }

    /// Load, apply `f`, save. The list is only written when `f` succeeds.
    pub fn update<T, F>(&self, f: F) -> Result<(TodoList, T)>
    where
        F: FnOnce(&mut TodoList) -> Result<T>,
    {
        let mut list = self.load()?;
        let out = f(&mut list)?;
        self.save(&list)?;
        Ok((list, out))
    }
}
