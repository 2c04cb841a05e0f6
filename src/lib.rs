// Library surface for the binary and the headless/integration tests.
pub mod api;
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod editor;
pub mod effects;
pub mod error;
pub mod journal;
pub mod poller;
pub mod profile;
pub mod runtime;
pub mod submission;
pub mod telemetry;
pub mod ui;
pub mod verdict;
