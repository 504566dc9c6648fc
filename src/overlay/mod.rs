pub(crate) mod metrics;
pub(crate) mod render;
pub(crate) mod text;
