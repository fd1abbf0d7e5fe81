//! Finnish invoices in, printable PDFs out.

pub mod server;
