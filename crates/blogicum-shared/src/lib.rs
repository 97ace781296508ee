//! # Blogicum Shared
//!
//! Wire types shared by the server and its clients: form payloads, JSON
//! documents and RFC 7807 error bodies.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, PageResponse};
