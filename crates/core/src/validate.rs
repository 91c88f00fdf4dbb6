use crate::errors::ValidationError;

/// Upper bound on accepted input, in characters (not bytes).
pub const MAX_CODE_LEN: usize = 10_000;

/// Escape `<` and `>` to their HTML entities. Nothing else is touched, so this
/// is not a general-purpose HTML sanitizer.
#[must_use]
pub fn sanitize_input(raw: &str) -> String {
    raw.replace('<', "&lt;").replace('>', "&gt;")
}

/// Reject input longer than [`MAX_CODE_LEN`] characters. No truncation.
pub fn validate_code_length(code: &str) -> Result<(), ValidationError> {
    // byte length bounds the char count from above
    if code.len() <= MAX_CODE_LEN {
        return Ok(());
    }
    let len = code.chars().count();
    if len > MAX_CODE_LEN {
        Err(ValidationError::CodeTooLong { len })
    } else {
        Ok(())
    }
}

/// A client string that has been sanitized and then length-checked.
///
/// The length check runs on the escaped text, so input that fits before
/// escaping can still be rejected once every `<`/`>` has grown into an entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedInput(String);

impl ValidatedInput {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let sanitized = sanitize_input(raw);
        validate_code_length(&sanitized)?;
        Ok(Self(sanitized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for ValidatedInput {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
