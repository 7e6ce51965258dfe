// src/services/mod.rs
//! One function per REST endpoint. Services share nothing but the client.

pub mod admin;
pub mod auth;
pub mod blog;
pub mod career;

pub use admin::AdminService;
pub use auth::AuthService;
pub use blog::BlogService;
pub use career::CareerService;
