//! printable rendering of an invoice

pub mod layout;
pub mod pdf;
