pub mod banking;
pub(crate) mod time;
