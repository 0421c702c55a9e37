pub mod local_file;
pub mod metadata;
