//! Folio Server
//!
//! Community portfolio platform: role-gated submissions, a moderation
//! workflow, profile pages and best-effort notifications.

pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod identity;
pub mod moderation;
pub mod notifications;
pub mod profiles;
pub mod store;
pub mod submissions;
pub mod visibility;
