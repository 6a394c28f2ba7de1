//! Domain layer: the fragment entry contract and per-name load state.

pub mod load_state;
pub mod module;

pub use load_state::LoadStatus;
pub use module::{FragmentContext, FragmentInstance, LoadedModule, ModuleCatalog, RemoteModule};
