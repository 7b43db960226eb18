pub mod endpoint;
pub mod multipart;
pub mod surf_logging;
