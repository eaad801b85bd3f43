//! GraphQL request envelope.

use serde_json::{Map, Value};

/// Body of a GraphQL POST: `{query, variables}`.
#[derive(Debug, Clone)]
pub struct GraphQlRequest {
    pub query: &'static str,
    pub variables: Map<String, Value>,
}

impl GraphQlRequest {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            variables: Map::new(),
        }
    }

    pub fn variable(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }

    pub fn to_payload(&self) -> Value {
        serde_json::json!({
            "query": self.query,
            "variables": Value::Object(self.variables.clone()),
        })
    }
}
