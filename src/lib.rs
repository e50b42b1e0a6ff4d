pub mod api;
pub mod app;
pub mod config;
pub mod days;
pub mod errors;
pub mod handlers;
pub mod nav;
pub mod scheduler;
pub mod search;
pub mod status;
pub mod timewin;
pub mod ui;
pub mod viewport;
