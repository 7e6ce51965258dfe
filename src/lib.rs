//! Client for the careers, learning and blog backend: typed records,
//! one service per area, and the flows behind the applicant and admin
//! screens (job applications, application review, filtered lists).

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod format;
pub mod listing;
pub mod output;
pub mod services;
pub mod submission;
pub mod types;

pub use config::ClientConfig;
pub use error::{ApiError, Result};
