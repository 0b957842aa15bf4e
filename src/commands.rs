//! Entry points for the command line.

pub mod commit;
