//! Photo storage backends

mod photo_store;

pub use photo_store::FilesystemPhotoStore;
