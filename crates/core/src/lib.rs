//! Core value model, input gate, and store trait.
//! No async and no IO within this crate.

pub mod errors;
pub mod model;
pub mod traits;
pub mod validate;

pub use crate::errors::{CoreError, ValidationError};
pub use crate::model::{
    check_user_id, progress_record_path, user_record_path, ExecutionResult, UserId, EXPLANATION_STUB,
    GITHUB_LINKED, PROGRESS_SAVED, USER_PROGRESS_STUB,
};
pub use crate::traits::{path_segments, Store};
pub use crate::validate::{sanitize_input, validate_code_length, ValidatedInput, MAX_CODE_LEN};
