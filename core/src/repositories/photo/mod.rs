//! Blob storage for verified identity photos.

mod r#trait;
pub use r#trait::PhotoStore;

mod mock;
pub use mock::MockPhotoStore;
