use serde_json::{Map, Value};

/// Realtime-database style document store addressed by slash-separated paths.
///
/// No async in core; callers should use spawn_blocking when invoking from async contexts.
pub trait Store {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Merge `fields` into the object at `path`, creating it if absent.
    /// Keys not named in `fields` are left alone.
    fn update(&self, path: &str, fields: &Map<String, Value>) -> Result<(), Self::Error>;

    /// Replace whatever is at `path` with `value`. Writing `null` removes it.
    fn set(&self, path: &str, value: &Value) -> Result<(), Self::Error>;

    fn get(&self, path: &str) -> Result<Option<Value>, Self::Error>;
}

/// Split a store path into its non-empty segments.
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
