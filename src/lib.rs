pub mod config;
pub mod db;
pub mod domain;
pub mod forms;
pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;
pub mod storage;

/// Path prefix shared by every versioned API route.
pub const API_PREFIX: &str = "/api/v1";
