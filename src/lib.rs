//! Asynchronous OCR worker
//!
//! Reacts to two kinds of trigger events: object creation (submit the new
//! image to the OCR service and remember the returned operation) and timer
//! ticks (check every remembered operation, write finished results, forget
//! the operation). Pending operations live in a durable [`services::job_store`].

pub mod app_state;
pub mod config;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
