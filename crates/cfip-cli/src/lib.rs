//! # cfip-cli
//!
//! Command-line front end for the cfip pipelines.
//!
//! ## Features
//!
//! - **collect**: latency-filtered candidates from every configured source
//! - **regions**: candidates restricted to registry-confirmed regions
//! - **classify**: look up the region of individual addresses
//! - **DNS publishing**: replace a Cloudflare A record set with the best addresses

pub mod cli;
pub mod config;
pub mod dns;
pub mod output;

pub use cli::run;
