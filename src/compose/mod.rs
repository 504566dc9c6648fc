//! Composite pipeline: plan the strip, load its images, draw, filter and encode.

pub(crate) mod backend;
pub(crate) mod cpu;
pub(crate) mod customize;
pub(crate) mod engine;
pub(crate) mod filter;
pub(crate) mod plan;
