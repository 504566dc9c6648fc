//! Export: local copy plus hand-off to the external photo store.

pub(crate) mod adapter;
