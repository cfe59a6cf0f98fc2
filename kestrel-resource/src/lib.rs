//! The garbage-collected, indexed asset store and loader registry that
//! underpin every asset kind in the engine. This crate is deliberately
//! generic over the asset payload type: `kestrel-impl::resource` is where
//! the seven concrete kinds (mesh, material, texture, font, sound,
//! particle script, binary blob) get bundled into one `AssetManager` with
//! parent/child delegation on top.

pub mod asset;
pub mod kinds;
pub mod loader;
pub mod store;
pub mod vfs;

pub use asset::{AssetMeta, GcMethod};
pub use kinds::{BinaryBlob, Font, ParticleScript, Sound, Texture, TextureFormat};
pub use loader::{LoadOptions, LoaderRegistry, LoaderType};
pub use store::AssetStore;
pub use vfs::VirtualFileSystem;
