use std::fmt;

/// Upper bound on a message, in code points.
pub const MAX_MESSAGE_LEN: usize = 280;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    #[error("message is {len} code points, limit is 280")]
    TooLong { len: usize },
}

/// Accepted input type for `set-message`: UTF-8, at most
/// [`MAX_MESSAGE_LEN`] code points. The empty string is representable;
/// rejecting it is the contract's job, not the type's.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(text: impl Into<String>) -> Result<Self, TextError> {
        let text = text.into();
        let len = text.chars().count();
        if len > MAX_MESSAGE_LEN {
            return Err(TextError::TooLong { len });
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in code points.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MessageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
