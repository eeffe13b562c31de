//! The three admin resource domains.
//!
//! Each module provides the domain types, its `Resource` implementation
//! (wire envelope decoding + stats bookkeeping), and resource-specific
//! operations on `RemoteStore` (ticket replies, subscriber status sugar,
//! media folders and uploads).

pub mod media;
pub mod subscriber;
pub mod ticket;
