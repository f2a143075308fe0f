//! Attach path context to I/O failures of tree documents.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

pub trait IoResultExt<T> {
    /// Wrap an I/O error as `OperationFailed`, naming the action and path.
    ///
    /// ```ignore
    /// fs.write(&path, &json).with_path_context("write tree", &path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;

    /// Like [`with_path_context`](Self::with_path_context), but a missing
    /// file becomes `TreeNotFound`.
    fn or_tree_not_found(self, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }

    fn or_tree_not_found(self, path: &Path) -> ApplicationResult<T> {
        match self {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ApplicationError::TreeNotFound(path.to_path_buf()))
            }
            other => other.with_path_context("read tree", path),
        }
    }
}
