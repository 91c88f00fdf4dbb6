//! The four stub operations. Every one of them runs its input through the
//! gate before doing anything else and fails without touching the store.

use std::sync::Arc;

use codeviz_core::{
    check_user_id, progress_record_path, sanitize_input, user_record_path, CoreError,
    ExecutionResult, Store, ValidatedInput, EXPLANATION_STUB, GITHUB_LINKED, PROGRESS_SAVED,
};
use serde_json::{Map, Value};
use tracing::{error, info};

/// Operations shared by every transport.
///
/// `link_github` and `save_progress` block on the store; async callers go
/// through [`run_blocking`].
pub trait Operations: Send + Sync {
    fn execute_code(&self, code: &str, lang: &str) -> Result<ExecutionResult, CoreError>;
    fn explain_code(&self, code: &str) -> Result<&'static str, CoreError>;
    fn link_github(&self, user: Option<&str>, token: &str) -> Result<&'static str, CoreError>;
    fn save_progress(&self, user: Option<&str>, data: &str) -> Result<&'static str, CoreError>;
}

pub struct Resolvers<S> {
    store: Arc<S>,
}

impl<S> Resolvers<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

fn require_user(user: Option<&str>) -> Result<&str, CoreError> {
    user.map_or(Err(CoreError::MissingContext("user_id")), check_user_id)
}

fn log_failure(label: &str, err: &CoreError) {
    match err {
        CoreError::Validation(e) => error!("Validation error: {e}"),
        other => error!(error = %other, "{label} error"),
    }
}

fn store_error(e: impl std::error::Error) -> CoreError {
    CoreError::Store(e.to_string())
}

impl<S> Resolvers<S>
where
    S: Store,
{
    fn link(&self, user: Option<&str>, token: &str) -> Result<&'static str, CoreError> {
        let token = sanitize_input(token);
        let user = require_user(user)?;
        let mut fields = Map::new();
        fields.insert("github_token".into(), Value::String(token));
        self.store
            .update(&user_record_path(user), &fields)
            .map_err(store_error)?;
        info!(%user, "github account linked");
        Ok(GITHUB_LINKED)
    }

    fn save(&self, user: Option<&str>, data: &str) -> Result<&'static str, CoreError> {
        let data = sanitize_input(data);
        let user = require_user(user)?;
        let value: Value =
            serde_json::from_str(&data).map_err(|e| CoreError::MalformedData(e.to_string()))?;
        self.store
            .set(&progress_record_path(user), &value)
            .map_err(store_error)?;
        info!(%user, "progress saved");
        Ok(PROGRESS_SAVED)
    }
}

impl<S> Operations for Resolvers<S>
where
    S: Store + Send + Sync,
{
    fn execute_code(&self, code: &str, lang: &str) -> Result<ExecutionResult, CoreError> {
        match ValidatedInput::new(code) {
            Ok(_) => {
                info!("Executing {lang} code");
                Ok(ExecutionResult::empty())
            }
            Err(e) => {
                let err = CoreError::from(e);
                log_failure("Execution", &err);
                Err(err)
            }
        }
    }

    fn explain_code(&self, code: &str) -> Result<&'static str, CoreError> {
        ValidatedInput::new(code)
            .map(|_| EXPLANATION_STUB)
            .map_err(|e| {
                let err = CoreError::from(e);
                log_failure("Explanation", &err);
                err
            })
    }

    fn link_github(&self, user: Option<&str>, token: &str) -> Result<&'static str, CoreError> {
        self.link(user, token).map_err(|e| {
            log_failure("GitHub link", &e);
            e
        })
    }

    fn save_progress(&self, user: Option<&str>, data: &str) -> Result<&'static str, CoreError> {
        self.save(user, data).map_err(|e| {
            log_failure("Progress save", &e);
            e
        })
    }
}

/// Run a store-touching operation on the blocking pool.
pub async fn run_blocking<T, F>(ops: Arc<dyn Operations>, f: F) -> Result<T, CoreError>
where
    F: FnOnce(&dyn Operations) -> Result<T, CoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(ops.as_ref()))
        .await
        .map_err(|e| CoreError::Internal(e.to_string()))?
}
