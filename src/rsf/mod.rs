//! RSF (Register Serialisation Format): the tab-delimited, line-oriented
//! command stream that a register's entire history can be expressed as.

mod command;
mod emit;
mod parser;

pub use command::{Action, Command};
pub use emit::{emit, emit_command};
pub use parser::{parse, parse_command, parse_hash};
