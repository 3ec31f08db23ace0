use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{Result, anyhow};

use crate::principal::Principal;
use crate::text::MessageText;

/// Backing storage for the principal -> message mapping.
///
/// Each call is a single atomic step: a reader sees either the old or the
/// new record, never a partial write. Validation lives in
/// [`MessageBoard`](crate::MessageBoard); stores persist what they are given.
pub trait RecordStore: Send + Sync {
    fn load(&self, owner: &Principal) -> Result<Option<MessageText>>;

    /// Create or overwrite the owner's record.
    fn save(&self, owner: &Principal, text: &MessageText) -> Result<()>;

    /// Reset the owner's record to unset. Removing an absent record is a no-op.
    fn remove(&self, owner: &Principal) -> Result<()>;
}

/// In-process store for tests and ephemeral nodes.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Principal, MessageText>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn load(&self, owner: &Principal) -> Result<Option<MessageText>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Store lock poisoned: {}", e))?;
        Ok(records.get(owner).cloned())
    }

    fn save(&self, owner: &Principal, text: &MessageText) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Store lock poisoned: {}", e))?;
        records.insert(owner.clone(), text.clone());
        Ok(())
    }

    fn remove(&self, owner: &Principal) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Store lock poisoned: {}", e))?;
        records.remove(owner);
        Ok(())
    }
}
