pub mod app;
pub mod archive;
pub mod config;
pub mod domain;
pub mod error;
pub mod grid;
pub mod locate;
pub mod nodeping;
pub mod ordering;
pub mod output;
pub mod sheets;
