//! # Blogicum Core
//!
//! The domain layer of the Blogicum blog.
//! Entities, the visibility and ownership rules, listing filters and the ports
//! that infrastructure implements. No I/O happens in this crate.

pub mod domain;
pub mod error;
pub mod listing;
pub mod policy;
pub mod ports;

pub use error::DomainError;
