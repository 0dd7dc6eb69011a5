//! HTTP surface of the host server

pub mod handlers;
