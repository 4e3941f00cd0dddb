pub(crate) mod convention;
pub(crate) mod decode;
pub(crate) mod fetch;
pub(crate) mod loader;
pub(crate) mod sequence;
