//! Bundles one [`AssetStore`] per concrete asset kind behind a single
//! [`AssetManager`], and adds parent/child delegation on top (spec §4.3,
//! `original_source/simulant/asset_manager.cpp`'s `AssetManager` tree).
//!
//! The original chases a raw `AssetManager*` parent pointer, so a child's
//! `get(id)` forwards straight to the parent's map on miss. Each
//! [`AssetStore`] here mints handles from its own `Pool`, but a handle
//! minted in a parent's pool is still meaningful when handed to that same
//! parent, so `get_*`/`get_mut_*` search the local store first and defer to
//! the parent on miss, same as the original. `find_*` (by name) goes one
//! step further and adopts a parent hit by cloning the payload into the
//! child's own store under a freshly-minted, local handle, since a handle
//! can't be forced into a caller-chosen slot in a different `Pool`. Every
//! store is `RefCell`-wrapped so a child can reach a mutable slot inside a
//! parent it only holds a shared reference to.

mod manager;

pub use manager::AssetManager;
