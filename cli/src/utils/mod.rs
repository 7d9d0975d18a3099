pub mod logger;
pub mod serde;
