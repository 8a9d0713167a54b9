pub mod gcs;
pub mod traits;

pub use gcs::GcsObjectStorage;
pub use traits::ObjectStorage;
