use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::principal::Principal;
use crate::platform::billing::{BillingSessions, RedirectUrl};
use crate::platform::identity::IdentityProvider;
use crate::platform::store::{EntityStore, Filter};

/// Collection name the identity records live under.
const USERS: &str = "User";

/// In-memory stand-in for the managed platform: entity tables, identity
/// records and session tokens behind locks. Used by the test suites and for
/// local runs without platform credentials.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Value>>>,
    sessions: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an identity record, as the platform does when an invitation
    /// is accepted.
    pub async fn insert_principal(&self, principal: &Principal) {
        let record = serde_json::json!(principal);
        self.tables
            .write()
            .await
            .entry(USERS.to_string())
            .or_default()
            .push(record);
    }

    /// Bind a session token to a principal id.
    pub async fn authenticate(&self, token: &str, principal_id: &str) {
        self.sessions
            .write()
            .await
            .insert(token.to_string(), principal_id.to_string());
    }
}

fn cmp_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

fn sort_records(records: &mut [Value], sort: &str) {
    let (field, descending) = match sort.strip_prefix('-') {
        Some(f) => (f, true),
        None => (sort, false),
    };
    records.sort_by(|a, b| {
        let ord = cmp_values(
            a.get(field).unwrap_or(&Value::Null),
            b.get(field).unwrap_or(&Value::Null),
        );
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

fn merge_patch(record: &mut Value, patch: &Value) {
    if let (Value::Object(target), Value::Object(fields)) = (record, patch) {
        for (k, v) in fields {
            target.insert(k.clone(), v.clone());
        }
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn list(&self, entity: &'static str) -> Result<Vec<Value>> {
        let tables = self.tables.read().await;
        Ok(tables.get(entity).cloned().unwrap_or_default())
    }

    async fn filter(
        &self,
        entity: &'static str,
        filter: &Filter,
        sort: Option<&str>,
    ) -> Result<Vec<Value>> {
        let tables = self.tables.read().await;
        let mut matched: Vec<Value> = tables
            .get(entity)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| filter.matches(r))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some(sort) = sort {
            sort_records(&mut matched, sort);
        }
        Ok(matched)
    }

    async fn create(&self, entity: &'static str, mut fields: Value) -> Result<Value> {
        if let Value::Object(ref mut map) = fields {
            map.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
            map.insert("created_date".into(), serde_json::json!(Utc::now()));
        }
        self.tables
            .write()
            .await
            .entry(entity.to_string())
            .or_default()
            .push(fields.clone());
        Ok(fields)
    }

    async fn update(&self, entity: &'static str, id: &str, patch: Value) -> Result<Value> {
        let mut tables = self.tables.write().await;
        let records = tables.entry(entity.to_string()).or_default();
        let record = records
            .iter_mut()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
            .ok_or(Error::NotFound(entity))?;
        merge_patch(record, &patch);
        if let Value::Object(map) = record {
            map.insert("updated_date".into(), serde_json::json!(Utc::now()));
        }
        Ok(record.clone())
    }

    async fn delete(&self, entity: &'static str, id: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        let records = tables.entry(entity.to_string()).or_default();
        let before = records.len();
        records.retain(|r| r.get("id").and_then(Value::as_str) != Some(id));
        if records.len() == before {
            return Err(Error::NotFound(entity));
        }
        Ok(())
    }

    async fn bulk_delete(&self, entity: &'static str, filter: &Filter) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let records = tables.entry(entity.to_string()).or_default();
        let before = records.len();
        records.retain(|r| !filter.matches(r));
        Ok((before - records.len()) as u64)
    }
}

#[async_trait]
impl IdentityProvider for MemoryStore {
    async fn me(&self, token: &str) -> Result<Principal> {
        let id = self
            .sessions
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(Error::Unauthenticated)?;
        self.get(&id).await.map_err(|_| Error::Unauthenticated)
    }

    async fn get(&self, id: &str) -> Result<Principal> {
        let tables = self.tables.read().await;
        let record = tables
            .get(USERS)
            .and_then(|users| {
                users
                    .iter()
                    .find(|u| u.get("id").and_then(Value::as_str) == Some(id))
            })
            .ok_or(Error::NotFound("user"))?;
        Ok(serde_json::from_value(record.clone())?)
    }

    async fn list(&self) -> Result<Vec<Principal>> {
        let tables = self.tables.read().await;
        tables
            .get(USERS)
            .map(|users| {
                users
                    .iter()
                    .map(|u| serde_json::from_value(u.clone()).map_err(Into::into))
                    .collect()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn update(&self, id: &str, patch: Value) -> Result<Principal> {
        let mut tables = self.tables.write().await;
        let users = tables.entry(USERS.to_string()).or_default();
        let record = users
            .iter_mut()
            .find(|u| u.get("id").and_then(Value::as_str) == Some(id))
            .ok_or(Error::NotFound("user"))?;
        merge_patch(record, &patch);
        Ok(serde_json::from_value(record.clone())?)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        {
            let mut tables = self.tables.write().await;
            let users = tables.entry(USERS.to_string()).or_default();
            let before = users.len();
            users.retain(|u| u.get("id").and_then(Value::as_str) != Some(id));
            if users.len() == before {
                return Err(Error::NotFound("user"));
            }
        }
        self.sessions.write().await.retain(|_, pid| pid != id);
        Ok(())
    }

    async fn logout(&self, token: &str) -> Result<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}

#[async_trait]
impl BillingSessions for MemoryStore {
    async fn create_checkout_session(&self, token: &str) -> Result<RedirectUrl> {
        self.me(token).await?;
        Ok(RedirectUrl {
            url: "https://billing.invalid/checkout".into(),
        })
    }

    async fn create_portal_session(&self, token: &str) -> Result<RedirectUrl> {
        self.me(token).await?;
        Ok(RedirectUrl {
            url: "https://billing.invalid/portal".into(),
        })
    }
}
