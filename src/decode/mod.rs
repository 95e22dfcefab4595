//! Response decoder module
//!
//! Turns response bodies into [`PageEnvelope`]s and rejected responses into
//! [`RemoteErrorBody`] values.

mod decoders;
mod types;

pub use decoders::{decode_envelope, decode_error_body};
pub use types::{PageEnvelope, RemoteError, RemoteErrorBody, RAW_BODY_DISPLAY_LIMIT};

#[cfg(test)]
mod tests;
