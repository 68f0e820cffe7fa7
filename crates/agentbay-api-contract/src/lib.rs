//! AgentBay session service API contract types and validation
//!
//! This crate defines the wire types shared by every AgentBay client
//! operation: the session lifecycle model, the context synchronization
//! policy objects, request/response envelopes, and the client-side
//! validation rules that must run before anything reaches the network.

pub mod error;
pub mod types;
pub mod validation;

pub use error::*;
pub use types::*;
