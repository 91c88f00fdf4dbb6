use codeviz_core::{path_segments, Store};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EphemeralError {
    #[error("invalid path: {0:?}")]
    InvalidPath(String),
}

/// Whole database held as one JSON tree.
pub struct EphemeralStore {
    root: RwLock<Value>,
}

impl EphemeralStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the entire tree, for inspection.
    pub fn snapshot(&self) -> Value {
        self.root.read().clone()
    }
}

impl Default for EphemeralStore {
    fn default() -> Self {
        Self {
            root: RwLock::new(Value::Object(Map::new())),
        }
    }
}

fn segments(path: &str) -> Result<Vec<&str>, EphemeralError> {
    let segs: Vec<&str> = path_segments(path).collect();
    if segs.is_empty() {
        return Err(EphemeralError::InvalidPath(path.to_string()));
    }
    Ok(segs)
}

/// Walk to the node at `segs`, turning anything in the way into an object.
fn node_mut<'a>(root: &'a mut Value, segs: &[&str]) -> &'a mut Value {
    let mut node = root;
    for seg in segs {
        if !node.is_object() {
            *node = Value::Null;
        }
        // indexing null by key turns it into an object holding that key
        node = &mut node[*seg];
    }
    node
}

impl Store for EphemeralStore {
    type Error = EphemeralError;

    fn update(&self, path: &str, fields: &Map<String, Value>) -> Result<(), Self::Error> {
        let segs = segments(path)?;
        let mut root = self.root.write();
        let node = node_mut(&mut root, &segs);
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        if let Value::Object(map) = node {
            for (k, v) in fields {
                if v.is_null() {
                    map.remove(k);
                } else {
                    map.insert(k.clone(), v.clone());
                }
            }
        }
        Ok(())
    }

    fn set(&self, path: &str, value: &Value) -> Result<(), Self::Error> {
        let segs = segments(path)?;
        let mut root = self.root.write();
        if value.is_null() {
            let Some((last, parents)) = segs.split_last() else {
                return Ok(());
            };
            let mut node = &mut *root;
            for seg in parents {
                match node.get_mut(*seg) {
                    Some(next) => node = next,
                    None => return Ok(()),
                }
            }
            if let Value::Object(map) = node {
                map.remove(*last);
            }
            return Ok(());
        }
        *node_mut(&mut root, &segs) = value.clone();
        Ok(())
    }

    fn get(&self, path: &str) -> Result<Option<Value>, Self::Error> {
        let root = self.root.read();
        let mut node = &*root;
        for seg in path_segments(path) {
            match node.get(seg) {
                Some(next) => node = next,
                None => return Ok(None),
            }
        }
        if node.is_null() {
            Ok(None)
        } else {
            Ok(Some(node.clone()))
        }
    }
}
