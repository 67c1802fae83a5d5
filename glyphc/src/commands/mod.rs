//! Subcommand implementations, one module per command, per `faxt`'s
//! `commands/` layout.

pub mod read;
