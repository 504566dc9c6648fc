pub(crate) mod buffer;
pub(crate) mod device;
pub(crate) mod session;
pub(crate) mod upload;
