//! Domain entity definitions.

mod image;
mod profile;

pub use self::image::{ImageKey, ImageSource, LoadedImage, UploadedImage};
pub use profile::{UserId, UserProfile};
