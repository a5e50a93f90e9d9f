//! Feed transport for the Seismon live earthquake monitor.
//!
//! Two interchangeable sources push raw text frames into the ingest
//! channel: a real WebSocket connection with reconnect backoff, and a
//! synthetic generator for development. Both stop through the same
//! [`StreamHandle`], and neither interprets frame contents -- that is
//! `seismon-core`'s normalizer's job.
//!
//! # Modules
//!
//! - [`channel`] -- The single live connection, its backoff loop, and the
//!   idempotent shutdown handle.
//! - [`simulator`] -- Synthetic mixed-shape frames on a fixed interval.
//!
//! [`StreamHandle`]: channel::StreamHandle

pub mod channel;
pub mod simulator;
