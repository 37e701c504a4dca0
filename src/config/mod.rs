//! Configuration value parsing.

pub mod newline;
