//! # Register Core
//!
//! A self-describing, append-only register: every mutation is an entry in
//! a Merkle-backed log, every value is a content-addressed blob, and the
//! register's own schema is derived from its metadata log rather than
//! declared out of band.
//!
//! ## Core Concepts
//!
//! - **Blobs**: content-addressed, canonically-encoded attribute maps
//! - **Entries**: positional references from a key to a blob, in one of two
//!   logs (user data, or register system metadata)
//! - **Log**: an append-only, Merkle-verified sequence of entries
//! - **RSF**: the tab-delimited wire format a log's full history replays as
//! - **Schema/Validator**: the datatype vocabulary derived from the
//!   metadata log, and the grammars values are checked against
//! - **Patch**: a batch of commands constructed from tabular input or an
//!   existing command sequence, optionally sealed by root-hash assertions
//!
//! ## Example
//!
//! ```ignore
//! use register_core::{rsf, Register, Patch, Schema};
//!
//! let commands = rsf::parse(&std::fs::read_to_string("country.rsf")?)?;
//! let register = Register::from_commands(commands)?;
//!
//! for (key, record) in register.records() {
//!     println!("{key}: {}", record.to_json());
//! }
//! ```
//!
//! Command-line dispatch, terminal rendering, static-site generation and
//! deployment-target config emission are presentation-layer concerns that
//! sit on top of this crate, not part of it.

pub mod blob;
pub mod canonical;
pub mod entry;
pub mod error;
pub mod hash;
pub mod log;
pub mod merkle;
pub mod patch;
pub mod record;
pub mod register;
pub mod rsf;
pub mod schema;
pub mod time;
pub mod validator;
pub mod xsv;

pub use blob::{Blob, Value};
pub use entry::{Entry, Scope};
pub use error::{RegisterError, Result};
pub use hash::Hash;
pub use log::{Log, LogStats};
pub use patch::Patch;
pub use record::Record;
pub use register::{Context, Register};
pub use schema::{Attribute, Cardinality, Datatype, Schema};
