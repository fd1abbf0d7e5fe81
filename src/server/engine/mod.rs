//! tax arithmetic and money formatting, no I/O

pub mod currency;
pub mod totals;
