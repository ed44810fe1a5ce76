/// Phonebook API
///
/// Multi-tenant contacts backend: registration and JWT authentication, plus
/// per-user phonebook entries backed by a shared deduplicated name dictionary.

pub mod account;
pub mod api;
pub mod auth;
pub mod config;
pub mod contacts;
pub mod context;
pub mod db;
pub mod error;
pub mod names;
pub mod password;
pub mod server;
pub mod token;
