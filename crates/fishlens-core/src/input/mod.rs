//! Image input: acquisition, validation, decoding and directory discovery.

pub mod decode;
pub mod discovery;
pub mod source;
pub mod validate;

pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::FileDiscovery;
pub use source::ImageInput;
pub use validate::{sniff_media_type, Validator};
