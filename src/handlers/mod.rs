//! One module per resource; handlers stay thin and push rules into
//! `service` and the store.

pub mod auth;
pub mod configs;
pub mod groups;
pub mod health;
pub mod sites;
pub mod transfer;
