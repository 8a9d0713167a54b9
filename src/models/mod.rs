pub mod image;
pub mod recontext;

pub use image::*;
pub use recontext::*;
