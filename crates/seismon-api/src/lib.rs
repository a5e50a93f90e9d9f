//! Typed HTTP client for the Seismon analytics backend.
//!
//! The live pipeline works without a backend; everything here is the
//! optional read side: historical queries, precomputed analytics,
//! authoritative clusters, heatmap grids, and the relationship graph.
//! All failures are local -- the gateway turns them into error responses
//! and the stream keeps flowing.
//!
//! # Modules
//!
//! - [`client`] -- the REST client and its query types
//! - [`error`] -- the typed API error
//! - [`poll`] -- bounded refresh schedule after clustering config changes

pub mod client;
pub mod error;
pub mod poll;
