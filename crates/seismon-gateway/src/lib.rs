//! Gateway API server for the Seismon live event pipeline.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/feed`) pushing every accepted event
//!   and alert via [`tokio::sync::broadcast`]
//! - **REST endpoints** for the live pipeline state (events, filters,
//!   layers, grid clusters, playback, alerts)
//! - **Proxied endpoints** for the analytics backend (heatmap,
//!   analytics charts, relationship graph, clustering config)
//! - **Minimal HTML status page** (`GET /`) showing store fill,
//!   playback state, and links to the API endpoints
//!
//! # Architecture
//!
//! The gateway serves everything from the shared [`AppState`]: the
//! ingest task in the monitor binary writes events and alerts into it,
//! and every handler reads through the same locks. Backend-proxied
//! endpoints degrade independently -- an unreachable backend produces
//! `502`/`503` responses while the live feed keeps flowing.
//!
//! [`AppState`]: state::AppState

pub mod alerts;
pub mod error;
pub mod handlers;
pub mod playback;
pub mod proxy;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use state::{AppState, FeedBroadcast};
