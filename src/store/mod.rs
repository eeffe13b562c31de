//! The client-side resource manager pattern.
//!
//! Each admin resource type (tickets, subscribers, media) gets one
//! `RemoteStore`: the single source of truth for the current page of server
//! results, with network-first / cache-fallback reads and write reconciliation
//! against the local collection. `ResourceManager` layers filter state,
//! debounced search, selection, and rendering on top.

pub mod cache;
pub mod filter;
pub mod manager;
pub mod remote_store;
pub mod resource;
