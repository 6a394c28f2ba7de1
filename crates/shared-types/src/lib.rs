//! # Shared Types Crate
//!
//! Domain types shared by the shell host and every fragment it composes.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Anything that crosses a fragment boundary is
//!   defined here, never redeclared inside a fragment.
//! - **Static Descriptors**: `RemoteDescriptor`s are configuration; nothing
//!   mutates them after start-up.
//! - **Host-Owned State**: `AppState` is only ever changed by applying a
//!   `StateAction`; fragments never write fields directly.

pub mod app_state;
pub mod entities;
pub mod errors;
pub mod payloads;

pub use app_state::*;
pub use entities::*;
pub use errors::*;
pub use payloads::*;
