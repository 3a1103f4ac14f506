//! Codec and tooling library for the 3DF family of model formats: the raw
//! 3DF mesh, the CAR bundle (mesh + baked animations + sounds) and the 3DN
//! variant.
//!
//! Decoding produces plain in-memory arrays plus a [`ValidationReport`] of
//! everything that was repaired or looked suspicious; encoding takes the
//! same arrays back, byte-exact for every field without documented
//! precision loss. Fatal corruption surfaces as a typed [`FormatError`].
//!
//! [`ValidationReport`]: validation::report::ValidationReport
//! [`FormatError`]: error::FormatError

pub mod animation;
pub mod error;
pub mod math;
pub mod model;
pub mod skeleton;
pub mod sound;
pub mod texture;
pub mod validation;

pub use error::{FormatError, Result};
pub use model::{DecodeOptions, EncodeOptions, Model, PackedTexture};
pub use validation::report::{
    ValidationCategory, ValidationItem, ValidationReport, ValidationSeverity,
};
