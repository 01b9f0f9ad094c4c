pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod dates;
pub mod download;
pub mod error;
pub mod flatten;
pub mod pipeline;
pub mod poller;
pub mod report;
pub mod request;
pub mod settings;
pub mod util;
