//! In-memory storage, for tests and for running without a state directory

use std::{
    collections::HashMap,
    sync::Mutex,
};

use anyhow::anyhow;

use super::Storage;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let entries = self.entries.lock()
            .map_err(|e| anyhow!("Failed to lock memory storage: {}", e))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.lock()
            .map_err(|e| anyhow!("Failed to lock memory storage: {}", e))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
