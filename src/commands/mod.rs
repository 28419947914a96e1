pub mod config;
pub mod delete;
pub mod get;
pub mod health;
pub mod list;
pub mod mark;
pub mod send;
pub mod stats;
