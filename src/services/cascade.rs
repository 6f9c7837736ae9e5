use serde::Serialize;
use tracing::info;

use crate::error::{CascadeStep, Error, Result};
use crate::models::client::Client;
use crate::models::message::Message;
use crate::models::session::Session;
use crate::platform::identity::IdentityProvider;
use crate::platform::store::{filter_as, Entity, EntityStore, Filter};

/// Step log for a finished deletion.
#[derive(Debug, Serialize)]
pub struct CascadeReport {
    pub coach_id: String,
    pub coach_email: String,
    pub clients_removed: u64,
    pub sessions_removed: u64,
    pub messages_removed: u64,
    pub completed: Vec<CascadeStep>,
}

fn partial(failed: CascadeStep, completed: Vec<CascadeStep>, source: Error) -> Error {
    Error::PartialCascade {
        failed,
        completed,
        source: Box::new(source),
    }
}

pub struct CascadeService;

impl CascadeService {
    /// Delete a coach and every dependent record, dependents first:
    ///
    /// 1. Resolve the coach principal
    /// 2. Collect their clients' `created_by` owner emails
    /// 3. Bulk-delete Sessions and Messages keyed to those emails — two
    ///    independent deletions, dispatched together and jointly awaited
    /// 4. Bulk-delete the Client rows
    /// 5. Delete the principal record
    ///
    /// Not atomic and never retried here: on failure the error names the
    /// step that stopped the sequence plus everything already completed, so
    /// an operator can decide on cleanup or a deliberate rerun. A rerun
    /// re-issues completed bulk-deletes as no-ops.
    pub async fn delete_coach_and_all_data(
        store: &dyn EntityStore,
        identity: &dyn IdentityProvider,
        coach_id: &str,
    ) -> Result<CascadeReport> {
        let coach = identity.get(coach_id).await.map_err(|e| match e {
            Error::NotFound(_) => Error::NotFound("coach"),
            other => other,
        })?;
        let mut completed = vec![CascadeStep::ResolveCoach];

        let clients = filter_as::<Client>(
            store,
            &Filter::new().eq("coach_email", coach.email.clone()),
            None,
        )
        .await
        .map_err(|e| partial(CascadeStep::CollectClients, completed.clone(), e))?;

        // Dependent records key off each client's own account email
        // (`created_by`), not the coach's and not necessarily `Client.email`.
        let owner_emails: Vec<String> = clients
            .iter()
            .filter_map(|c| c.created_by.clone())
            .collect();
        completed.push(CascadeStep::CollectClients);

        let mut sessions_removed = 0;
        let mut messages_removed = 0;
        if !owner_emails.is_empty() {
            let key = Filter::new().any_of("client_email", owner_emails);
            let (sessions, messages) = tokio::join!(
                store.bulk_delete(Session::NAME, &key),
                store.bulk_delete(Message::NAME, &key),
            );
            // Both outcomes are inspected before step 4, so a failure on one
            // side never hides the other side's result.
            match (sessions, messages) {
                (Ok(s), Ok(m)) => {
                    completed.push(CascadeStep::DeleteSessions);
                    completed.push(CascadeStep::DeleteMessages);
                    sessions_removed = s;
                    messages_removed = m;
                }
                (Err(e), Ok(_)) => {
                    completed.push(CascadeStep::DeleteMessages);
                    return Err(partial(CascadeStep::DeleteSessions, completed, e));
                }
                (Ok(_), Err(e)) => {
                    completed.push(CascadeStep::DeleteSessions);
                    return Err(partial(CascadeStep::DeleteMessages, completed, e));
                }
                (Err(e), Err(_)) => {
                    return Err(partial(CascadeStep::DeleteSessions, completed, e));
                }
            }
        } else {
            // Nothing keyed to this coach's clients; both steps are trivially
            // complete.
            completed.push(CascadeStep::DeleteSessions);
            completed.push(CascadeStep::DeleteMessages);
        }

        let clients_removed = store
            .bulk_delete(
                Client::NAME,
                &Filter::new().eq("coach_email", coach.email.clone()),
            )
            .await
            .map_err(|e| partial(CascadeStep::DeleteClients, completed.clone(), e))?;
        completed.push(CascadeStep::DeleteClients);

        identity
            .delete(&coach.id)
            .await
            .map_err(|e| partial(CascadeStep::DeleteCoach, completed.clone(), e))?;
        completed.push(CascadeStep::DeleteCoach);

        info!(
            "deleted coach {} ({}): {} clients, {} sessions, {} messages",
            coach.email, coach.id, clients_removed, sessions_removed, messages_removed
        );

        Ok(CascadeReport {
            coach_id: coach.id,
            coach_email: coach.email,
            clients_removed,
            sessions_removed,
            messages_removed,
            completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::principal::Principal;
    use crate::platform::memory::MemoryStore;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    async fn seed_coach(store: &MemoryStore, id: &str, email: &str) {
        let coach: Principal = serde_json::from_value(json!({
            "id": id,
            "email": email,
            "full_name": "Jo",
            "role": "user",
            "user_type": "coach",
        }))
        .unwrap();
        store.insert_principal(&coach).await;
    }

    async fn seed_client(store: &MemoryStore, coach_email: &str, email: &str, created_by: &str) {
        store
            .create(
                "Client",
                json!({
                    "full_name": "Client",
                    "email": email,
                    "coach_email": coach_email,
                    "created_by": created_by,
                }),
            )
            .await
            .unwrap();
    }

    async fn seed_keyed(store: &MemoryStore, entity: &'static str, client_email: &str) {
        let mut fields = json!({
            "client_email": client_email,
            "coach_email": "whoever@x.com",
            "subject": "s",
            "content": "c",
            "sender_type": "client",
            "is_read": false,
            "priority": "normal",
        });
        if entity == "Session" {
            fields["session_date"] = json!("2026-05-01");
            fields["status"] = json!("scheduled");
        }
        store.create(entity, fields).await.unwrap();
    }

    #[tokio::test]
    async fn deletes_dependents_then_clients_then_principal() {
        let store = MemoryStore::new();
        seed_coach(&store, "K1", "jo@x.com").await;
        seed_client(&store, "jo@x.com", "c1@x.com", "e1@x.com").await;
        seed_client(&store, "jo@x.com", "c2@x.com", "e2@x.com").await;
        seed_keyed(&store, "Session", "e1@x.com").await;
        seed_keyed(&store, "Session", "e2@x.com").await;
        seed_keyed(&store, "Message", "e1@x.com").await;
        // Unrelated records survive.
        seed_keyed(&store, "Session", "bystander@x.com").await;
        seed_keyed(&store, "Message", "bystander@x.com").await;

        let report = CascadeService::delete_coach_and_all_data(&store, &store, "K1")
            .await
            .unwrap();

        assert_eq!(report.clients_removed, 2);
        assert_eq!(report.sessions_removed, 2);
        assert_eq!(report.messages_removed, 1);
        assert_eq!(
            report.completed,
            vec![
                CascadeStep::ResolveCoach,
                CascadeStep::CollectClients,
                CascadeStep::DeleteSessions,
                CascadeStep::DeleteMessages,
                CascadeStep::DeleteClients,
                CascadeStep::DeleteCoach,
            ]
        );

        assert_eq!(EntityStore::list(&store, "Session").await.unwrap().len(), 1);
        assert_eq!(EntityStore::list(&store, "Message").await.unwrap().len(), 1);
        assert!(EntityStore::list(&store, "Client").await.unwrap().is_empty());
        assert!(matches!(
            store.get("K1").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn dependents_key_off_created_by_not_client_email() {
        let store = MemoryStore::new();
        seed_coach(&store, "K1", "jo@x.com").await;
        // Owner identity differs from the contact address on the record.
        seed_client(&store, "jo@x.com", "contact@x.com", "owner@x.com").await;
        seed_keyed(&store, "Session", "owner@x.com").await;
        seed_keyed(&store, "Session", "contact@x.com").await;

        let report = CascadeService::delete_coach_and_all_data(&store, &store, "K1")
            .await
            .unwrap();

        // Only the owner-keyed session goes; the contact-keyed one is not in
        // the deletion key set.
        assert_eq!(report.sessions_removed, 1);
        let left = EntityStore::list(&store, "Session").await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].get("client_email").unwrap(), "contact@x.com");
    }

    #[tokio::test]
    async fn missing_coach_is_not_found_and_nothing_runs() {
        let store = MemoryStore::new();
        seed_keyed(&store, "Session", "e1@x.com").await;

        let err = CascadeService::delete_coach_and_all_data(&store, &store, "ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound("coach")));
        assert_eq!(EntityStore::list(&store, "Session").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn coach_with_no_clients_still_loses_the_principal_record() {
        let store = MemoryStore::new();
        seed_coach(&store, "K1", "jo@x.com").await;

        let report = CascadeService::delete_coach_and_all_data(&store, &store, "K1")
            .await
            .unwrap();
        assert_eq!(report.clients_removed, 0);
        assert_eq!(report.completed.len(), 6);
        assert!(matches!(store.get("K1").await, Err(Error::NotFound(_))));
    }

    /// Delegates to a `MemoryStore` but fails `bulk_delete` for one entity
    /// kind.
    struct FailingStore<'a> {
        inner: &'a MemoryStore,
        fail_on: &'static str,
    }

    #[async_trait]
    impl EntityStore for FailingStore<'_> {
        async fn list(&self, entity: &'static str) -> Result<Vec<Value>> {
            EntityStore::list(self.inner, entity).await
        }

        async fn filter(
            &self,
            entity: &'static str,
            filter: &Filter,
            sort: Option<&str>,
        ) -> Result<Vec<Value>> {
            self.inner.filter(entity, filter, sort).await
        }

        async fn create(&self, entity: &'static str, fields: Value) -> Result<Value> {
            self.inner.create(entity, fields).await
        }

        async fn update(&self, entity: &'static str, id: &str, patch: Value) -> Result<Value> {
            EntityStore::update(self.inner, entity, id, patch).await
        }

        async fn delete(&self, entity: &'static str, id: &str) -> Result<()> {
            EntityStore::delete(self.inner, entity, id).await
        }

        async fn bulk_delete(&self, entity: &'static str, filter: &Filter) -> Result<u64> {
            if entity == self.fail_on {
                return Err(Error::Dependency("injected outage".into()));
            }
            self.inner.bulk_delete(entity, filter).await
        }
    }

    #[tokio::test]
    async fn client_step_failure_reports_partial_cascade_and_stops() {
        let store = MemoryStore::new();
        seed_coach(&store, "K1", "jo@x.com").await;
        seed_client(&store, "jo@x.com", "c1@x.com", "e1@x.com").await;
        seed_keyed(&store, "Session", "e1@x.com").await;
        seed_keyed(&store, "Message", "e1@x.com").await;

        let failing = FailingStore {
            inner: &store,
            fail_on: Client::NAME,
        };

        let err = CascadeService::delete_coach_and_all_data(&failing, &store, "K1")
            .await
            .unwrap_err();

        match err {
            Error::PartialCascade {
                failed, completed, ..
            } => {
                assert_eq!(failed, CascadeStep::DeleteClients);
                assert!(completed.contains(&CascadeStep::DeleteSessions));
                assert!(completed.contains(&CascadeStep::DeleteMessages));
                assert!(!completed.contains(&CascadeStep::DeleteClients));
            }
            other => panic!("expected PartialCascade, got {other:?}"),
        }

        // Dependents went first; the later steps never ran.
        assert!(EntityStore::list(&store, "Session").await.unwrap().is_empty());
        assert!(EntityStore::list(&store, "Message").await.unwrap().is_empty());
        assert_eq!(EntityStore::list(&store, "Client").await.unwrap().len(), 1);
        assert!(store.get("K1").await.is_ok());
    }

    #[tokio::test]
    async fn session_step_failure_stops_before_clients_are_touched() {
        let store = MemoryStore::new();
        seed_coach(&store, "K1", "jo@x.com").await;
        seed_client(&store, "jo@x.com", "c1@x.com", "e1@x.com").await;
        seed_keyed(&store, "Session", "e1@x.com").await;
        seed_keyed(&store, "Message", "e1@x.com").await;

        let failing = FailingStore {
            inner: &store,
            fail_on: Session::NAME,
        };

        let err = CascadeService::delete_coach_and_all_data(&failing, &store, "K1")
            .await
            .unwrap_err();

        match err {
            Error::PartialCascade { failed, .. } => {
                assert_eq!(failed, CascadeStep::DeleteSessions);
            }
            other => panic!("expected PartialCascade, got {other:?}"),
        }

        // The client rows and the principal are untouched.
        assert_eq!(EntityStore::list(&store, "Client").await.unwrap().len(), 1);
        assert!(store.get("K1").await.is_ok());
    }
}
