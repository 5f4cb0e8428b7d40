//! Input reading and source fingerprinting.

mod reader;
mod source;

pub use reader::InputReader;
pub use source::InputFingerprint;
