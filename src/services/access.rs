use crate::error::{Error, Result};
use crate::models::principal::{Actor, Principal};
use crate::platform::identity::IdentityProvider;
use crate::platform::store::Filter;

/// Resolve the caller at the start of an operation. The returned record is
/// the explicit session context handlers pass down — there is no ambient
/// current-user state.
pub async fn resolve(identity: &dyn IdentityProvider, token: &str) -> Result<Principal> {
    identity.me(token).await
}

pub fn require_admin(principal: &Principal) -> Result<()> {
    match principal.classify() {
        Actor::Admin => Ok(()),
        Actor::Coach | Actor::Client | Actor::Unrecognized => Err(Error::AccessDenied),
    }
}

pub fn require_client(principal: &Principal) -> Result<()> {
    match principal.classify() {
        Actor::Client => Ok(()),
        Actor::Admin | Actor::Coach | Actor::Unrecognized => Err(Error::AccessDenied),
    }
}

/// Scope handle for the coach data partition.
///
/// Opened either by the coach themselves (read-write) or by an admin preview
/// (read-only impersonation). Preview revokes every mutation, regardless of
/// what the admin could otherwise do — a narrowing, never an elevation.
#[derive(Debug, Clone)]
pub struct CoachAccess {
    coach: Principal,
    read_only: bool,
}

impl CoachAccess {
    pub fn for_coach(principal: &Principal) -> Result<Self> {
        match principal.classify() {
            Actor::Coach => Ok(Self {
                coach: principal.clone(),
                read_only: false,
            }),
            Actor::Admin | Actor::Client | Actor::Unrecognized => Err(Error::AccessDenied),
        }
    }

    /// Admin-only, and only for an account already confirmed as a coach.
    pub fn preview(admin: &Principal, coach: Principal) -> Result<Self> {
        require_admin(admin)?;
        if coach.user_type.as_deref() != Some("coach") {
            return Err(Error::Validation(format!(
                "{} has not been confirmed as a coach yet",
                coach.display_name()
            )));
        }
        Ok(Self {
            coach,
            read_only: true,
        })
    }

    pub fn coach(&self) -> &Principal {
        &self.coach
    }

    pub fn email(&self) -> &str {
        &self.coach.email
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The query scope this handle is restricted to.
    pub fn client_filter(&self) -> Filter {
        Filter::new().eq("coach_email", self.coach.email.clone())
    }

    pub fn allow_write(&self) -> Result<()> {
        if self.read_only {
            Err(Error::AccessDenied)
        } else {
            Ok(())
        }
    }
}
