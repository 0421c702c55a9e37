pub mod capabilities;
pub mod recorder;
