//! SSE HTTP handler for the web layer.
//!
//! This module contains only the Axum handler for the event stream endpoint.
//! Session tracking, fan-out and the per-subscriber delivery loop live in the
//! `sse` crate.

pub mod handler;
