use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutePayload {
    pub code: String,
    pub lang: String,
}

/// Body of `POST /graphql/execute`. Unlike the GraphQL type, variables are a
/// JSON object here.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExecuteResponse {
    pub trace: Vec<String>,
    pub variables: Map<String, Value>,
}

impl ExecuteResponse {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            trace: Vec::new(),
            variables: Map::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetailResponse {
    pub detail: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
