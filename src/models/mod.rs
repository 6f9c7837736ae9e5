pub mod client;
pub mod message;
pub mod principal;
pub mod session;
pub mod subscription;
