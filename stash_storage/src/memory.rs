use log::debug;
use stash_core::storage::{KeyValueStore, StoreError};
use std::{cell::RefCell, collections::HashMap, rc::Rc};

#[derive(Default)]
struct MemoryState {
    data: HashMap<String, String>,
    quota: Option<usize>,
    disabled: bool,
}

/// In-process key-value store.
///
/// Clones share the same entries, the way every handle to
/// `window.localStorage` sees the same data. The quota is counted in UTF-16
/// code units over keys and values, as browsers count it.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<MemoryState>>,
}

fn units(s: &str) -> usize {
    s.encode_utf16().count()
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        let store = Self::default();
        store.state.borrow_mut().quota = Some(quota);
        store
    }

    /// Makes every operation fail with [`StoreError::Disabled`] until
    /// re-enabled.
    pub fn set_disabled(&self, disabled: bool) {
        self.state.borrow_mut().disabled = disabled;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().data.is_empty()
    }

    #[must_use]
    pub fn usage(&self) -> usize {
        self.state
            .borrow()
            .data
            .iter()
            .map(|(k, v)| units(k) + units(v))
            .sum()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.state.borrow().disabled {
            return Err(StoreError::Disabled);
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.state.borrow().data.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;

        let usage = self.usage();
        let mut state = self.state.borrow_mut();

        if let Some(quota) = state.quota {
            let replaced = state.data.get(key).map_or(0, |old| units(key) + units(old));
            let needed = usage - replaced + units(key) + units(value);
            if needed > quota {
                debug!("Refusing to write {key:?}: {needed} units over quota of {quota}");
                return Err(StoreError::QuotaExceeded {
                    key: key.to_owned(),
                });
            }
        }

        state.data.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.state.borrow_mut().data.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.check()?;
        self.state.borrow_mut().data.clear();
        Ok(())
    }
}
