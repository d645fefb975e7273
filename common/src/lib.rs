//! Types shared between the jirai server and its clients.
//!
//! [`models`] holds the field catalog's data model, [`protocol`] the request
//! and response bodies exchanged over HTTP.

pub mod models;
pub mod protocol;
