/// Basic application code
pub mod app;
/// Request authorization pipeline
pub mod auth;
/// REST clients for outside services
pub mod client;
/// Controllers for REST endpoints
pub mod controller;
/// Cryptography-related objects
pub mod crypto;
/// Domain objects
pub mod domain;
/// Error enums for the REST layer
pub mod error;
/// Stored and transported records
pub mod model;
/// JSON response envelope
pub mod output;
/// Repositories
pub mod repo;
/// Identity, session and delay services
pub mod service;
/// Application settings
pub mod settings;
/// Application telemetry for tracing and logging
pub mod telemetry;
