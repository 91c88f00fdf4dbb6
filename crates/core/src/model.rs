use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Identifier handed to us by the upstream identity layer.
pub type UserId = String;

pub const EXPLANATION_STUB: &str = "Explanation stub";
pub const GITHUB_LINKED: &str = "GitHub account linked";
pub const PROGRESS_SAVED: &str = "Progress saved";
pub const USER_PROGRESS_STUB: &str = "User progress stub";

/// Result of an execution request. Execution itself is not implemented, so
/// every call produces the same empty trace.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionResult {
    pub trace: Vec<String>,
    /// Serialized variable snapshot.
    pub variables: String,
}

impl ExecutionResult {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            trace: Vec::new(),
            variables: "{}".to_owned(),
        }
    }
}

/// Characters a user id may not contain: path separators, key characters the
/// realtime database reserves, and URL delimiters.
const RESERVED_ID_CHARS: &[char] = &['/', '.', '#', '$', '[', ']', '?', '%'];

/// Accept a user id only if it names exactly one store key.
pub fn check_user_id(user: &str) -> Result<&str, CoreError> {
    let user = user.trim();
    if user.is_empty() {
        return Err(CoreError::MissingContext("user_id"));
    }
    if user
        .chars()
        .any(|c| c.is_control() || RESERVED_ID_CHARS.contains(&c))
    {
        return Err(CoreError::InvalidUserId(user.to_owned()));
    }
    Ok(user)
}

/// Store path of the user record that holds linked account tokens.
#[must_use]
pub fn user_record_path(user: &str) -> String {
    format!("users/{user}")
}

/// Store path of a user's saved progress.
#[must_use]
pub fn progress_record_path(user: &str) -> String {
    format!("progress/{user}")
}
