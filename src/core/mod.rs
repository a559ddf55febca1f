pub mod app;
pub mod config;
pub mod dialog;
pub mod error;
pub mod input;
pub mod logging;
pub mod note;
pub mod store;
