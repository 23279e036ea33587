pub mod api;
pub mod command_cache;
pub mod config;
pub mod control;
pub mod db;
pub mod mqtt;
pub mod sensors;
