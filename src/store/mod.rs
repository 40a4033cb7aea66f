pub mod blobs;
pub mod files;
pub mod layout;
