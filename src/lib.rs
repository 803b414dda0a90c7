pub mod app;
pub mod config;
pub mod fetch;
pub mod format;
pub mod proxy;
pub mod records;
pub mod view;
