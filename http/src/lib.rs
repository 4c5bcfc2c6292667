//! gb-http: reqwest transport for the gb benchmark engine
//!
//! Implements the `gb-core` client traits:
//!
//! - [`ReqwestClientFactory`] builds one independent [`ReqwestClient`] per
//!   worker and performs the preflight check
//! - [`ReqwestClient`] dispatches a request and exposes the body as a stream
//!   of chunk lengths
//!
//! Transport errors are mapped onto [`gb_core::ClientError`] with the full
//! source chain in the message.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod client;
mod factory;

pub use client::{ReqwestClient, MAX_REDIRECTS};
pub use factory::ReqwestClientFactory;

#[cfg(test)]
mod test_server;
