pub mod cache;
pub mod catalog;
pub mod config;
pub mod context;
pub mod fallback;
pub mod http;
pub mod model;
pub mod orchestrator;
pub mod quota;
pub mod state;
pub mod store;
pub mod tools;
pub mod types;
