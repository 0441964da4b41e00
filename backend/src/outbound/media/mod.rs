//! Media storage outbound adapters.

mod cloudinary;

pub use cloudinary::{CLOUDINARY_HOST, CloudinaryMediaStore};
