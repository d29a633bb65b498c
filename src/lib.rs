//! In-process model of the Unix account databases.
//!
//! Parses `/etc/passwd`, `/etc/shadow` and `/etc/group` into typed records
//! and applies changes by shelling out to the shadow-utils tools
//! (`useradd`, `usermod`, `chage`, ...). The tools remain the single source
//! of truth: every successful mutation re-reads the files, so in-memory
//! state never drifts from disk.
//!
//! ## Modules
//! - `core` — Stores and the record parser
//! - `models` — Record types and field changes
//! - `util` — Privilege check and tool invocation

pub mod constants;
pub mod core;
pub mod error;
pub mod models;
pub mod util;

pub use crate::core::group::{GroupEntry, Groups};
pub use crate::core::passwd::{Passwd, UserEntry};
pub use crate::error::{Error, Result};
pub use crate::models::group::{Group, GroupChange, GroupChanges, NewGroup};
pub use crate::models::user::{
    NewUser, PasswordState, ShadowInfo, User, UserChange, UserChanges,
};
pub use crate::util::system::{HostTools, ToolRunner};
