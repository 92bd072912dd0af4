//! Asynchronous outbound-notification service: a retrying job queue that
//! delivers order-status messages through an external messaging gateway,
//! plus the admin surface that operates it.

pub mod api;
pub mod clients;
pub mod config;
pub mod models;
pub mod queue;
pub mod strategy;
pub mod utils;
pub mod worker;
