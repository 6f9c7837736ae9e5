use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::models::client::{
    default_program_stages, Client, CreateClientRequest, UpdateClientRequest,
};
use crate::models::principal::Principal;
use crate::platform::store::{create_as, filter_as, update_as, Entity, EntityStore, Filter};
use crate::services::access::CoachAccess;

pub struct ClientService;

impl ClientService {
    /// Clients in the scope's partition.
    pub async fn list(store: &dyn EntityStore, access: &CoachAccess) -> Result<Vec<Client>> {
        filter_as::<Client>(store, &access.client_filter(), None).await
    }

    /// Create a client in the coach's partition. Ownership fields, the
    /// sessions counter and the starting program are stamped here, never
    /// taken from the request.
    pub async fn create(
        store: &dyn EntityStore,
        access: &CoachAccess,
        req: &CreateClientRequest,
    ) -> Result<Client> {
        access.allow_write()?;
        if req.full_name.trim().is_empty() {
            return Err(Error::Validation("full_name is required".into()));
        }
        if req.email.trim().is_empty() {
            return Err(Error::Validation("email is required".into()));
        }
        let total_sessions = req.total_sessions.unwrap_or(10);
        if total_sessions < 0 {
            return Err(Error::Validation(
                "total_sessions cannot be negative".into(),
            ));
        }

        let fields = json!({
            "full_name": req.full_name,
            "email": req.email,
            "phone": req.phone,
            "program_type": req.program_type,
            "total_sessions": total_sessions,
            "start_date": req.start_date,
            "description": req.description,
            "coach_email": access.email(),
            "coach_name": access.coach().display_name(),
            "sessions_used": 0,
            "program_stages": default_program_stages(),
        });
        create_as::<Client>(store, fields).await
    }

    /// Patch a client the scope owns. `sessions_used` may never exceed
    /// `total_sessions`, counting values carried over from the stored record
    /// when the request leaves one side out.
    pub async fn update(
        store: &dyn EntityStore,
        access: &CoachAccess,
        id: &str,
        req: &UpdateClientRequest,
    ) -> Result<Client> {
        access.allow_write()?;
        let existing = Self::owned(store, access, id).await?;

        let total = req.total_sessions.unwrap_or(existing.total_sessions);
        let used = req.sessions_used.unwrap_or(existing.sessions_used);
        if total < 0 || used < 0 {
            return Err(Error::Validation(
                "session counts cannot be negative".into(),
            ));
        }
        if used > total {
            return Err(Error::Validation(
                "sessions_used cannot exceed total_sessions".into(),
            ));
        }

        let mut patch = Map::new();
        if let Some(v) = &req.full_name {
            if v.trim().is_empty() {
                return Err(Error::Validation("full_name cannot be empty".into()));
            }
            patch.insert("full_name".into(), json!(v));
        }
        if let Some(v) = &req.phone {
            patch.insert("phone".into(), json!(v));
        }
        if let Some(v) = &req.program_type {
            patch.insert("program_type".into(), json!(v));
        }
        if req.total_sessions.is_some() {
            patch.insert("total_sessions".into(), json!(total));
        }
        if req.sessions_used.is_some() {
            patch.insert("sessions_used".into(), json!(used));
        }
        if let Some(v) = &req.start_date {
            patch.insert("start_date".into(), json!(v));
        }
        if let Some(v) = &req.description {
            patch.insert("description".into(), json!(v));
        }
        if let Some(v) = &req.program_stages {
            patch.insert("program_stages".into(), json!(v));
        }

        update_as::<Client>(store, id, Value::Object(patch)).await
    }

    /// Remove a client the scope owns.
    pub async fn remove(store: &dyn EntityStore, access: &CoachAccess, id: &str) -> Result<()> {
        access.allow_write()?;
        Self::owned(store, access, id).await?;
        store.delete(Client::NAME, id).await
    }

    /// Fetch by id and check the record sits in this scope's partition.
    async fn owned(store: &dyn EntityStore, access: &CoachAccess, id: &str) -> Result<Client> {
        let mut matches =
            filter_as::<Client>(store, &Filter::new().eq("id", id), None).await?;
        let client = matches.pop().ok_or(Error::NotFound("client"))?;
        if client.coach_email != access.email() {
            return Err(Error::AccessDenied);
        }
        Ok(client)
    }

    /// The caller's own client record (client self-view).
    pub async fn profile_for(store: &dyn EntityStore, principal: &Principal) -> Result<Client> {
        let mut matches = filter_as::<Client>(
            store,
            &Filter::new().eq("email", principal.email.clone()),
            None,
        )
        .await?;
        matches.pop().ok_or(Error::NotFound("client profile"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::client::StageStatus;
    use crate::platform::memory::MemoryStore;

    fn coach(email: &str) -> Principal {
        serde_json::from_value(json!({
            "id": email,
            "email": email,
            "full_name": "Jo Coach",
            "role": "user",
            "user_type": "coach",
        }))
        .unwrap()
    }

    fn create_request(name: &str, email: &str) -> CreateClientRequest {
        serde_json::from_value(json!({ "full_name": name, "email": email })).unwrap()
    }

    #[tokio::test]
    async fn create_stamps_ownership_and_default_program() {
        let store = MemoryStore::new();
        let access = CoachAccess::for_coach(&coach("k@x.com")).unwrap();

        let client = ClientService::create(&store, &access, &create_request("Sam", "sam@x.com"))
            .await
            .unwrap();

        assert_eq!(client.coach_email, "k@x.com");
        assert_eq!(client.coach_name.as_deref(), Some("Jo Coach"));
        assert_eq!(client.sessions_used, 0);
        assert_eq!(client.total_sessions, 10);
        assert_eq!(client.program_stages.len(), 4);
        assert!(client
            .program_stages
            .iter()
            .all(|s| s.status == StageStatus::Planning));
    }

    #[tokio::test]
    async fn create_requires_name_and_email() {
        let store = MemoryStore::new();
        let access = CoachAccess::for_coach(&coach("k@x.com")).unwrap();

        let err = ClientService::create(&store, &access, &create_request("", "sam@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = ClientService::create(&store, &access, &create_request("Sam", " "))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn list_is_partitioned_per_coach() {
        let store = MemoryStore::new();
        let mine = CoachAccess::for_coach(&coach("k@x.com")).unwrap();
        let theirs = CoachAccess::for_coach(&coach("rival@x.com")).unwrap();

        ClientService::create(&store, &mine, &create_request("Sam", "sam@x.com"))
            .await
            .unwrap();
        ClientService::create(&store, &theirs, &create_request("Lee", "lee@x.com"))
            .await
            .unwrap();

        let own = ClientService::list(&store, &mine).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].email, "sam@x.com");
    }

    #[tokio::test]
    async fn another_coach_cannot_touch_the_record() {
        let store = MemoryStore::new();
        let mine = CoachAccess::for_coach(&coach("k@x.com")).unwrap();
        let theirs = CoachAccess::for_coach(&coach("rival@x.com")).unwrap();

        let client = ClientService::create(&store, &mine, &create_request("Sam", "sam@x.com"))
            .await
            .unwrap();

        let err = ClientService::remove(&store, &theirs, &client.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AccessDenied));

        let err = ClientService::update(
            &store,
            &theirs,
            &client.id,
            &UpdateClientRequest::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::AccessDenied));
    }

    #[tokio::test]
    async fn preview_scope_cannot_mutate() {
        let store = MemoryStore::new();
        let mine = CoachAccess::for_coach(&coach("k@x.com")).unwrap();
        let client = ClientService::create(&store, &mine, &create_request("Sam", "sam@x.com"))
            .await
            .unwrap();

        let admin: Principal = serde_json::from_value(json!({
            "id": "a1", "email": "admin@x.com", "role": "admin",
        }))
        .unwrap();
        let preview = CoachAccess::preview(&admin, coach("k@x.com")).unwrap();

        // Reads reuse the coach scope...
        let seen = ClientService::list(&store, &preview).await.unwrap();
        assert_eq!(seen.len(), 1);

        // ...but every mutation is rejected, even though an admin could
        // normally manage the coach.
        assert!(matches!(
            ClientService::remove(&store, &preview, &client.id).await,
            Err(Error::AccessDenied)
        ));
        assert!(matches!(
            ClientService::create(&store, &preview, &create_request("Eve", "eve@x.com")).await,
            Err(Error::AccessDenied)
        ));
    }

    #[tokio::test]
    async fn sessions_used_cannot_exceed_total() {
        let store = MemoryStore::new();
        let access = CoachAccess::for_coach(&coach("k@x.com")).unwrap();
        let client = ClientService::create(&store, &access, &create_request("Sam", "sam@x.com"))
            .await
            .unwrap();

        let req: UpdateClientRequest =
            serde_json::from_value(json!({ "sessions_used": 11 })).unwrap();
        let err = ClientService::update(&store, &access, &client.id, &req)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let req: UpdateClientRequest =
            serde_json::from_value(json!({ "sessions_used": 4 })).unwrap();
        let updated = ClientService::update(&store, &access, &client.id, &req)
            .await
            .unwrap();
        assert_eq!(updated.sessions_used, 4);
        assert_eq!(updated.sessions_remaining(), 6);
    }

    #[tokio::test]
    async fn profile_for_finds_the_single_own_record() {
        let store = MemoryStore::new();
        let access = CoachAccess::for_coach(&coach("k@x.com")).unwrap();
        ClientService::create(&store, &access, &create_request("Sam", "sam@x.com"))
            .await
            .unwrap();

        let me: Principal = serde_json::from_value(json!({
            "id": "c1", "email": "sam@x.com", "role": "user", "user_type": "client",
        }))
        .unwrap();
        let profile = ClientService::profile_for(&store, &me).await.unwrap();
        assert_eq!(profile.full_name, "Sam");

        let stranger: Principal = serde_json::from_value(json!({
            "id": "c2", "email": "ghost@x.com", "role": "user", "user_type": "client",
        }))
        .unwrap();
        assert!(matches!(
            ClientService::profile_for(&store, &stranger).await,
            Err(Error::NotFound(_))
        ));
    }
}
