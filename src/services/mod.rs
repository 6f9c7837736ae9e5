pub mod access;
pub mod admin;
pub mod billing;
pub mod cascade;
pub mod clients;
pub mod messages;
pub mod sessions;
