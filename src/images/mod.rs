mod storage;

pub use storage::{ImageInfo, ImageStore, ImageStoreError, StoredImage, url_for};
