//! SWF Client boundary (§4.11, §6): the wire types and trait this decider
//! uses to talk to the service, plus the `reqwest`-backed implementation.

pub mod client;
pub mod types;

pub use client::{HttpSwfClient, SwfClient};
