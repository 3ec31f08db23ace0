use std::fmt;
use std::str::FromStr;

/// c32 alphabet used by standard principals (no I, L, O, U).
const C32_ALPHABET: &str = "0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Network version characters: mainnet P/M, testnet T/N.
const VERSION_CHARS: &[char] = &['P', 'M', 'T', 'N'];

const MIN_LEN: usize = 28;
const MAX_LEN: usize = 41;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrincipalError {
    #[error("principal must be 28 to 41 characters, got {0}")]
    Length(usize),
    #[error("principal must start with 'S'")]
    Prefix,
    #[error("unknown network version '{0}'")]
    Version(char),
    #[error("invalid c32 character '{0}'")]
    Character(char),
}

/// A standard principal (account address). Keys the message store and
/// authorizes writes to its own record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Principal(String);

impl Principal {
    pub fn parse(input: &str) -> Result<Self, PrincipalError> {
        let normalized = input.trim().to_ascii_uppercase();

        let len = normalized.chars().count();
        if !(MIN_LEN..=MAX_LEN).contains(&len) {
            return Err(PrincipalError::Length(len));
        }

        let mut chars = normalized.chars();
        if chars.next() != Some('S') {
            return Err(PrincipalError::Prefix);
        }
        // Length check above guarantees a second char
        let version = chars.next().unwrap_or_default();
        if !VERSION_CHARS.contains(&version) {
            return Err(PrincipalError::Version(version));
        }
        if let Some(bad) = chars.find(|c| !C32_ALPHABET.contains(*c)) {
            return Err(PrincipalError::Character(bad));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
