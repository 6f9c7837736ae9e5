use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::principal::Principal;
use crate::platform::billing::{BillingSessions, RedirectUrl};
use crate::platform::identity::IdentityProvider;
use crate::platform::store::{EntityStore, Filter};

/// Client for the managed platform's REST surface. Implements all three
/// facade traits; the server holds one instance behind the trait objects.
pub struct RemoteStore {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
    api_key: String,
}

impl RemoteStore {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.platform_timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base_url: config.platform_base_url.trim_end_matches('/').to_string(),
            app_id: config.platform_app_id.clone(),
            api_key: config.platform_api_key.clone(),
        })
    }

    fn entities_url(&self, entity: &str) -> String {
        format!(
            "{}/api/apps/{}/entities/{}",
            self.base_url, self.app_id, entity
        )
    }

    fn users_url(&self) -> String {
        format!("{}/api/apps/{}/users", self.base_url, self.app_id)
    }

    fn auth_url(&self, action: &str) -> String {
        format!("{}/api/apps/{}/auth/{}", self.base_url, self.app_id, action)
    }

    fn functions_url(&self, name: &str) -> String {
        format!("{}/api/apps/{}/functions/{}", self.base_url, self.app_id, name)
    }

    /// Map a platform response to the error taxonomy. `what` names the record
    /// kind for 404s.
    async fn check(resp: reqwest::Response, what: &'static str) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        match status {
            StatusCode::UNAUTHORIZED => Err(Error::Unauthenticated),
            StatusCode::NOT_FOUND => Err(Error::NotFound(what)),
            _ => {
                let body = resp.text().await.unwrap_or_default();
                tracing::warn!("platform responded {status} for {what}: {body}");
                Err(Error::Dependency(format!("{what}: HTTP {status}")))
            }
        }
    }
}

#[async_trait]
impl EntityStore for RemoteStore {
    async fn list(&self, entity: &'static str) -> Result<Vec<Value>> {
        let resp = self
            .http
            .get(self.entities_url(entity))
            .header("api_key", &self.api_key)
            .send()
            .await?;
        Ok(Self::check(resp, entity).await?.json().await?)
    }

    async fn filter(
        &self,
        entity: &'static str,
        filter: &Filter,
        sort: Option<&str>,
    ) -> Result<Vec<Value>> {
        let mut params = vec![("q", filter.as_value().to_string())];
        if let Some(sort) = sort {
            params.push(("sort", sort.to_string()));
        }
        let resp = self
            .http
            .get(self.entities_url(entity))
            .header("api_key", &self.api_key)
            .query(&params)
            .send()
            .await?;
        Ok(Self::check(resp, entity).await?.json().await?)
    }

    async fn create(&self, entity: &'static str, fields: Value) -> Result<Value> {
        let resp = self
            .http
            .post(self.entities_url(entity))
            .header("api_key", &self.api_key)
            .json(&fields)
            .send()
            .await?;
        Ok(Self::check(resp, entity).await?.json().await?)
    }

    async fn update(&self, entity: &'static str, id: &str, patch: Value) -> Result<Value> {
        let resp = self
            .http
            .put(format!("{}/{id}", self.entities_url(entity)))
            .header("api_key", &self.api_key)
            .json(&patch)
            .send()
            .await?;
        Ok(Self::check(resp, entity).await?.json().await?)
    }

    async fn delete(&self, entity: &'static str, id: &str) -> Result<()> {
        let resp = self
            .http
            .delete(format!("{}/{id}", self.entities_url(entity)))
            .header("api_key", &self.api_key)
            .send()
            .await?;
        Self::check(resp, entity).await?;
        Ok(())
    }

    async fn bulk_delete(&self, entity: &'static str, filter: &Filter) -> Result<u64> {
        let resp = self
            .http
            .post(format!("{}/bulk-delete", self.entities_url(entity)))
            .header("api_key", &self.api_key)
            .json(&filter.as_value())
            .send()
            .await?;
        let body: Value = Self::check(resp, entity).await?.json().await?;
        Ok(body.get("deleted").and_then(Value::as_u64).unwrap_or(0))
    }
}

#[async_trait]
impl IdentityProvider for RemoteStore {
    async fn me(&self, token: &str) -> Result<Principal> {
        let resp = self
            .http
            .get(self.auth_url("me"))
            .header("api_key", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;
        let resp = Self::check(resp, "user").await.map_err(|e| match e {
            // An unknown session reads as unauthenticated, not missing.
            Error::NotFound(_) => Error::Unauthenticated,
            other => other,
        })?;
        Ok(resp.json().await?)
    }

    async fn get(&self, id: &str) -> Result<Principal> {
        let resp = self
            .http
            .get(format!("{}/{id}", self.users_url()))
            .header("api_key", &self.api_key)
            .send()
            .await?;
        Ok(Self::check(resp, "user").await?.json().await?)
    }

    async fn list(&self) -> Result<Vec<Principal>> {
        let resp = self
            .http
            .get(self.users_url())
            .header("api_key", &self.api_key)
            .send()
            .await?;
        Ok(Self::check(resp, "user").await?.json().await?)
    }

    async fn update(&self, id: &str, patch: Value) -> Result<Principal> {
        let resp = self
            .http
            .put(format!("{}/{id}", self.users_url()))
            .header("api_key", &self.api_key)
            .json(&patch)
            .send()
            .await?;
        Ok(Self::check(resp, "user").await?.json().await?)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let resp = self
            .http
            .delete(format!("{}/{id}", self.users_url()))
            .header("api_key", &self.api_key)
            .send()
            .await?;
        Self::check(resp, "user").await?;
        Ok(())
    }

    async fn logout(&self, token: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.auth_url("logout"))
            .header("api_key", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;
        Self::check(resp, "session").await?;
        Ok(())
    }
}

#[async_trait]
impl BillingSessions for RemoteStore {
    async fn create_checkout_session(&self, token: &str) -> Result<RedirectUrl> {
        let resp = self
            .http
            .post(self.functions_url("createCheckoutSession"))
            .header("api_key", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;
        Ok(Self::check(resp, "checkout session").await?.json().await?)
    }

    async fn create_portal_session(&self, token: &str) -> Result<RedirectUrl> {
        let resp = self
            .http
            .post(self.functions_url("createPortalSession"))
            .header("api_key", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;
        Ok(Self::check(resp, "portal session").await?.json().await?)
    }
}
