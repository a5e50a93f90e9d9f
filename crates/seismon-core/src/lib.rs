//! Core pipeline logic for the Seismon live earthquake monitor.
//!
//! Everything here is side-effect free: the stateful pieces (store,
//! playback controller) mutate only their own memory, and the rest are
//! pure functions over canonical types. Transport, HTTP, and task wiring
//! live in the `seismon-feed`, `seismon-api`, and `seismon-gateway` crates.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `seismon-config.yaml` into
//!   strongly-typed structs, with environment overrides.
//! - [`filter`] -- The magnitude/time predicate for snapshot evaluation.
//! - [`grid`] -- Grid-cell clustering over the visible event list.
//! - [`heat`] -- Min-max normalization of heatmap weights.
//! - [`normalize`] -- Wire frame normalization into canonical events.
//! - [`playback`] -- Timelapse playback controller and its timer task.
//! - [`retry`] -- Reconnect backoff and bounded poll schedules.
//! - [`store`] -- Bounded in-memory store of live events.

pub mod config;
pub mod filter;
pub mod grid;
pub mod heat;
pub mod normalize;
pub mod playback;
pub mod retry;
pub mod store;
