//! HTTP protocol layer
//!
//! Protocol-level helpers shared by the static-file stages of the
//! dispatcher: conditional requests, MIME lookup, byte ranges and
//! response builders. Nothing in here knows about the render capability.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

pub use range::parse_range_header;
pub use response::{
    build_cached_response, build_not_modified_response, build_partial_response,
    build_range_not_satisfiable_response, build_status_response,
};
