use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// An atomic symbol of the process alphabet
///
/// Original actions are the (ASCII alphabetic) characters read from the input,
/// stored as their character code. Synthetic actions are codes handed out by an
/// [`ActionCodeAllocator`](crate::discovery::abstraction::ActionCodeAllocator)
/// beyond that range, each standing for one previously abstracted pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(pub u32);

/// Largest code an original action can have (`'z'`)
pub const MAX_ORIGINAL_CODE: u32 = 'z' as u32;

impl Action {
    /// Numeric code of this action
    pub fn code(self) -> u32 {
        self.0
    }

    /// Whether this action comes from the input alphabet (in contrast to a synthetic pattern code)
    pub fn is_original(self) -> bool {
        self.as_char().is_some()
    }

    /// The letter of an original action, `None` for synthetic actions
    pub fn as_char(self) -> Option<char> {
        char::from_u32(self.0).filter(char::is_ascii_alphabetic)
    }
}

impl From<char> for Action {
    fn from(c: char) -> Self {
        Action(c as u32)
    }
}

impl From<u32> for Action {
    fn from(code: u32) -> Self {
        Action(code)
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Pad via `f.pad` so width/alignment flags work for both variants
        match self.as_char() {
            Some(c) => f.pad(c.encode_utf8(&mut [0; 4])),
            None => f.pad(&self.0.to_string()),
        }
    }
}
