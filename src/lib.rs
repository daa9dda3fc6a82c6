// Library for tests to access modules

pub mod api_client;
pub mod config;
pub mod coordinator;
pub mod entry_repo;
pub mod error;
pub mod hub;
pub mod models;
pub mod routes;
pub mod sensors;
pub mod setup_flow;
pub mod version;
