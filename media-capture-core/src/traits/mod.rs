pub mod capture_host;
pub mod encoder;
pub mod preview_surface;
pub mod session_delegate;
