//! Route handlers: bridge operations and window content

pub mod bridge;
pub mod content;
