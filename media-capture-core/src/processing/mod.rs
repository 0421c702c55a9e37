pub mod completion;
pub mod format;
pub mod fragment_buffer;
