//! # archivist-kernel: Functional core of `Archivist`
//!
//! The kernel is the pure, deterministic heart of the catalog. It receives
//! commands and produces state changes plus effects to execute.
//!
//! ## Key Principles
//!
//! - **No IO**: The kernel never touches disk or any external resource
//! - **No clocks**: Timestamps are added by the facade, not the kernel
//! - **Pure functions**: `apply_committed(state, command) -> (state, effects)`
//!
//! ## Architecture
//!
//! - [`validation`]: Staged decode of untyped record payloads into drafts
//! - [`command`]: Commands that can be submitted (`CreateCollection`, `AppendEdition`, ...)
//! - [`effects`]: Writes for the runtime to commit (`RecordWrite`, `CollectionHeaderWrite`, ...)
//! - [`state`]: In-memory catalog state and recovery
//! - [`kernel`]: The `apply_committed` function that ties it all together
//!
//! ## Example
//!
//! ```ignore
//! use archivist_kernel::{Command, State, apply_committed, validate_record_payload};
//!
//! let draft = validate_record_payload(&payload)?;
//! let cmd = Command::create_collection(draft, Timestamp::now());
//!
//! match apply_committed(State::new(), cmd) {
//!     Ok((new_state, effects)) => {
//!         // Commit effects, then keep new_state...
//!     }
//!     Err(e) => {
//!         // Handle error...
//!     }
//! }
//! ```

pub mod command;
pub mod effects;
pub mod kernel;
pub mod state;
pub mod state_hash;
pub mod validation;


pub use command::Command;
pub use effects::Effect;
pub use kernel::{KernelError, apply_committed};
pub use state::{Collection, State};
pub use validation::{REQUIRED_FIELDS, validate_record_payload};
