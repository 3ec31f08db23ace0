use serde::Serialize;

use board_types::api::ReadOnlyResponse;

/// What a UI shows for a principal's slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    pub text: Option<String>,
}

impl MessageView {
    /// The sentinel `"none"` and the empty string both mean "no message".
    /// A stored message whose text is literally "none" therefore renders as
    /// absent unless the node reports `present`.
    pub fn from_read(resp: &ReadOnlyResponse) -> Self {
        let text = resp
            .value
            .as_str()
            .filter(|t| !t.is_empty() && (resp.present || *t != "none"))
            .map(str::to_string);
        Self { text }
    }

    pub fn is_present(&self) -> bool {
        self.text.is_some()
    }
}
