pub mod app;
pub mod cards;
pub mod config;
pub mod error;
pub mod models;
pub mod scan;
