//! Image precondition pipeline: discovery, validation, decoding, size
//! normalization, and transport encoding.

pub(crate) mod decode;
pub(crate) mod discovery;
pub(crate) mod precondition;
pub(crate) mod processor;
pub(crate) mod validate;

pub use discovery::DiscoveredFile;
pub use processor::ImagePreparer;
