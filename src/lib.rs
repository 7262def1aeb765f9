pub mod adaptive;
pub mod config;
pub mod db;
pub mod logging;
pub mod seed;
pub mod services;
pub mod store;
