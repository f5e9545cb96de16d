//! Per-kind parsers turning raw source bodies into candidate records.

pub mod api;
pub mod local;
pub mod markup;
pub mod text;
