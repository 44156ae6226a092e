//! GraphQL request framing.
//!
//! A request is a static, named query document plus optional JSON variables.
//! It serializes to the standard GraphQL-over-HTTP body shape
//! (`query` / `variables` / `operationName`).

use serde::Serialize;
use serde_json::Value;

/// A GraphQL operation ready to be sent over the transport pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest {
    /// The GraphQL query document.
    pub query: String,

    /// Optional variables for the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,

    /// Optional operation name (required for documents with multiple operations).
    #[serde(skip_serializing_if = "Option::is_none", rename = "operationName")]
    pub operation_name: Option<String>,
}

impl GraphQLRequest {
    /// Create a new query request from a document.
    pub fn query(document: impl Into<String>) -> Self {
        Self {
            query: document.into(),
            variables: None,
            operation_name: None,
        }
    }

    /// Set the variables from any serializable value.
    pub fn variables(mut self, variables: impl Serialize) -> Self {
        self.variables = serde_json::to_value(variables).ok();
        self
    }

    /// Set the operation name.
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Stable cache key for this operation's result.
    ///
    /// The operation name identifies the document when one is set (our
    /// documents are all named); otherwise the whitespace-collapsed document
    /// text is used. Variables are appended so the same document with
    /// different inputs occupies different cache slots.
    pub fn operation_key(&self) -> String {
        let name = match &self.operation_name {
            Some(name) => name.clone(),
            None => self.query.split_whitespace().collect::<Vec<_>>().join(" "),
        };
        match &self.variables {
            Some(variables) => format!("{}({})", name, variables),
            None => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_shape() {
        let request = GraphQLRequest::query("query getAllFilms { allFilms { films { id title } } }")
            .operation_name("getAllFilms");
        let body = serde_json::to_value(&request).unwrap();

        assert!(body["query"].as_str().unwrap().contains("allFilms"));
        assert_eq!(body["operationName"], "getAllFilms");
        // No variables were set, so the field must be absent entirely
        assert!(body.get("variables").is_none());
    }

    #[test]
    fn test_operation_key_uses_name_and_variables() {
        let plain = GraphQLRequest::query("query getAllFilms { allFilms { films { id } } }")
            .operation_name("getAllFilms");
        assert_eq!(plain.operation_key(), "getAllFilms");

        let with_vars = GraphQLRequest::query("query getFilm($id: ID!) { film(id: $id) { title } }")
            .operation_name("getFilm")
            .variables(json!({"id": "ZmlsbXM6MQ=="}));
        assert!(with_vars.operation_key().starts_with("getFilm("));
        assert!(with_vars.operation_key().contains("ZmlsbXM6MQ=="));
    }

    #[test]
    fn test_operation_key_without_name_collapses_whitespace() {
        let a = GraphQLRequest::query("query {\n  hero\n}");
        let b = GraphQLRequest::query("query { hero }");
        assert_eq!(a.operation_key(), b.operation_key());
    }
}
