pub mod auth;
pub mod bookkeeper;
pub mod catalog;
pub mod config;
pub mod journal;
pub mod ledger;
pub mod models;
pub mod reports;
pub mod storage;
