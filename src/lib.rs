#![doc = "The `taskboard` library crate."]
#![doc = ""]
#![doc = "This crate contains the request handlers, schema validators, persistence gateway,"]
#![doc = "password hashing and error handling for the taskboard REST API."]
#![doc = "It is used by the main binary (`main.rs`) to construct and run the application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use error::AppError;
pub use state::AppState;
