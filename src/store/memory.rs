//! In-memory backend for tests; commits can be made to fail.

use std::{
    cell::{Cell, RefCell},
    io,
    path::Path,
};

use crate::entities::Todo;

use super::{Backend, StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct MemoryBackend {
    committed: RefCell<Vec<Todo>>,
    fail_persist: Cell<bool>,
    fail_load: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreadable() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }

    pub fn set_fail_persist(&self, fail: bool) {
        self.fail_persist.set(fail);
    }

    pub fn committed(&self) -> Vec<Todo> {
        self.committed.borrow().clone()
    }
}

fn refused(what: &str) -> StoreError {
    StoreError::io(Path::new("<memory>"), io::Error::other(what.to_string()))
}

impl Backend for MemoryBackend {
    fn load(&self) -> StoreResult<Vec<Todo>> {
        if self.fail_load {
            return Err(refused("backend marked unreadable"));
        }
        Ok(self.committed())
    }

    fn persist(&self, records: &[Todo]) -> StoreResult<()> {
        if self.fail_persist.get() {
            return Err(refused("backend rejected the commit"));
        }
        *self.committed.borrow_mut() = records.to_vec();
        Ok(())
    }
}

#[test]
fn refuses_commits_when_told_to() {
    use uuid::Uuid;

    let backend = MemoryBackend::new();
    backend.set_fail_persist(true);
    assert!(backend.persist(&[Todo::new(Uuid::new_v4())]).is_err());
    assert!(backend.committed().is_empty());
}
