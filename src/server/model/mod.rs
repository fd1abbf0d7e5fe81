pub mod config;
pub mod invoice;
pub(crate) mod preview;
