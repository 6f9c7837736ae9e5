use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// A remotely persisted entity kind. `NAME` is the collection name on the
/// managed platform.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const NAME: &'static str;
}

/// Field constraints for `filter` and `bulk_delete`: per-field equality, with
/// set membership through the platform's `$in` operator.
#[derive(Debug, Clone, Default)]
pub struct Filter(Map<String, Value>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn any_of<I, S>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<Value> = values.into_iter().map(|v| Value::String(v.into())).collect();
        self.0.insert(
            field.to_string(),
            serde_json::json!({ "$in": values }),
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Whether a JSON record satisfies every constraint. This is the reference
    /// semantics the in-memory store interprets; the remote store ships the
    /// filter to the platform verbatim.
    pub fn matches(&self, record: &Value) -> bool {
        self.0.iter().all(|(field, constraint)| {
            let actual = record.get(field).unwrap_or(&Value::Null);
            match constraint.get("$in").and_then(Value::as_array) {
                Some(allowed) => allowed.contains(actual),
                None => actual == constraint,
            }
        })
    }
}

/// Minimal abstraction over the platform's per-collection CRUD surface.
///
/// `sort` is a field name; a `-` prefix sorts descending. `bulk_delete` on an
/// empty match set is a successful no-op, so a repeated call never fails.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn list(&self, entity: &'static str) -> Result<Vec<Value>>;

    async fn filter(
        &self,
        entity: &'static str,
        filter: &Filter,
        sort: Option<&str>,
    ) -> Result<Vec<Value>>;

    async fn create(&self, entity: &'static str, fields: Value) -> Result<Value>;

    async fn update(&self, entity: &'static str, id: &str, patch: Value) -> Result<Value>;

    async fn delete(&self, entity: &'static str, id: &str) -> Result<()>;

    async fn bulk_delete(&self, entity: &'static str, filter: &Filter) -> Result<u64>;
}

/// Typed wrappers over the JSON surface.
pub async fn list_as<T: Entity>(store: &dyn EntityStore) -> Result<Vec<T>> {
    let records = store.list(T::NAME).await?;
    records
        .into_iter()
        .map(|r| serde_json::from_value(r).map_err(Into::into))
        .collect()
}

pub async fn filter_as<T: Entity>(
    store: &dyn EntityStore,
    filter: &Filter,
    sort: Option<&str>,
) -> Result<Vec<T>> {
    let records = store.filter(T::NAME, filter, sort).await?;
    records
        .into_iter()
        .map(|r| serde_json::from_value(r).map_err(Into::into))
        .collect()
}

pub async fn create_as<T: Entity>(store: &dyn EntityStore, fields: Value) -> Result<T> {
    let record = store.create(T::NAME, fields).await?;
    Ok(serde_json::from_value(record)?)
}

pub async fn update_as<T: Entity>(
    store: &dyn EntityStore,
    id: &str,
    patch: Value,
) -> Result<T> {
    let record = store.update(T::NAME, id, patch).await?;
    Ok(serde_json::from_value(record)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equality_match() {
        let f = Filter::new().eq("coach_email", "k@example.com");
        assert!(f.matches(&json!({ "coach_email": "k@example.com", "x": 1 })));
        assert!(!f.matches(&json!({ "coach_email": "other@example.com" })));
        assert!(!f.matches(&json!({})));
    }

    #[test]
    fn conjunction_of_fields() {
        let f = Filter::new()
            .eq("client_email", "c@example.com")
            .eq("status", "scheduled");
        assert!(f.matches(&json!({ "client_email": "c@example.com", "status": "scheduled" })));
        assert!(!f.matches(&json!({ "client_email": "c@example.com", "status": "cancelled" })));
    }

    #[test]
    fn in_operator_matches_membership() {
        let f = Filter::new().any_of("client_email", ["a@x.com", "b@x.com"]);
        assert!(f.matches(&json!({ "client_email": "a@x.com" })));
        assert!(f.matches(&json!({ "client_email": "b@x.com" })));
        assert!(!f.matches(&json!({ "client_email": "c@x.com" })));
        assert!(!f.matches(&json!({})));
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::new().matches(&json!({ "anything": true })));
    }
}
