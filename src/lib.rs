pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod invoices;
pub mod models;
pub mod payments;
pub mod services;

pub use db::create_pool;
