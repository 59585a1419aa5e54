pub mod commands;
pub mod config;
pub mod db;
pub mod feed;
pub mod models;
