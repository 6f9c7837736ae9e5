pub mod billing;
pub mod identity;
pub mod memory;
pub mod remote;
pub mod store;

pub use billing::{BillingSessions, RedirectUrl};
pub use identity::IdentityProvider;
pub use store::{Entity, EntityStore, Filter};
