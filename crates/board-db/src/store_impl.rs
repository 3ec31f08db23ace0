use anyhow::{Context, Result};
use board_contract::{MessageText, Principal, RecordStore};

use crate::Database;

impl RecordStore for Database {
    fn load(&self, owner: &Principal) -> Result<Option<MessageText>> {
        let Some(row) = self.get_message(owner.as_str())? else {
            return Ok(None);
        };
        let text = MessageText::new(row.text)
            .with_context(|| format!("Corrupt message row for {}", row.owner))?;
        Ok(Some(text))
    }

    fn save(&self, owner: &Principal, text: &MessageText) -> Result<()> {
        self.upsert_message(owner.as_str(), text.as_str())
    }

    fn remove(&self, owner: &Principal) -> Result<()> {
        self.delete_message(owner.as_str())?;
        Ok(())
    }
}
