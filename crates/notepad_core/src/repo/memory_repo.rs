//! In-process slot repository.
//!
//! Backs previews and tests. Read and write failures can be switched on to
//! exercise storage error paths without a broken database.

use crate::repo::kv_repo::{KvError, KvRepository, KvResult};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// `HashMap`-backed slot repository with injectable failures.
#[derive(Debug, Default)]
pub struct MemoryKvRepository {
    slots: RefCell<HashMap<String, String>>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryKvRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a slot with a raw value, bypassing the write counter.
    pub fn with_item(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.slots.borrow_mut().insert(key.into(), value.into());
        self
    }

    /// Makes every subsequent `get_item` fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Makes every subsequent `set_item` / `remove_item` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful writes since construction.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Raw slot value as last written.
    pub fn raw_item(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }

    fn check_writable(&self) -> KvResult<()> {
        if self.fail_writes.get() {
            return Err(KvError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

impl KvRepository for MemoryKvRepository {
    fn get_item(&self, key: &str) -> KvResult<Option<String>> {
        if self.fail_reads.get() {
            return Err(KvError::Unavailable("reads disabled".to_string()));
        }
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> KvResult<()> {
        self.check_writable()?;
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> KvResult<()> {
        self.check_writable()?;
        self.slots.borrow_mut().remove(key);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKvRepository;
    use crate::repo::kv_repo::{KvError, KvRepository};

    #[test]
    fn injected_failures_surface_as_unavailable() {
        let repo = MemoryKvRepository::new();
        repo.set_fail_writes(true);
        assert!(matches!(
            repo.set_item("k", "v"),
            Err(KvError::Unavailable(_))
        ));
        assert_eq!(repo.write_count(), 0);

        repo.set_fail_writes(false);
        repo.set_item("k", "v").unwrap();
        repo.set_fail_reads(true);
        assert!(matches!(repo.get_item("k"), Err(KvError::Unavailable(_))));
    }
}
