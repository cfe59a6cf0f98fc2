use crate::render::mesh::Mesh;
use kestrel_core::pool::Handle;
use kestrel_core::{EngineError, EngineResult};
use kestrel_material::Material;
use kestrel_resource::{AssetStore, BinaryBlob, Font, GcMethod, ParticleScript, Sound, Texture};
use std::cell::{Ref, RefCell, RefMut};
use std::time::Duration;

const FALLBACK_WHITE: &str = "kestrel:fallback_white";
const FALLBACK_BLACK: &str = "kestrel:fallback_black";
const FALLBACK_CHECKERBOARD: &str = "kestrel:fallback_checkerboard";

/// Owns one [`AssetStore`] per asset kind and, for a non-base manager, a
/// borrow of its parent. Mirrors `asset_manager.cpp`'s per-kind manager
/// fields and `CONCAT`-macro'd parent-forwarding accessors. Each store is
/// kept behind a `RefCell` so a child can look up *and* mutate through a
/// shared `&'p AssetManager<'p>` borrow of its parent - the only way
/// `get`/`get_mut` can defer to the parent on miss without requiring
/// exclusive access to the whole parent tree.
pub struct AssetManager<'p> {
    parent: Option<&'p AssetManager<'p>>,
    meshes: RefCell<AssetStore<Mesh>>,
    materials: RefCell<AssetStore<Material>>,
    textures: RefCell<AssetStore<Texture>>,
    fonts: RefCell<AssetStore<Font>>,
    sounds: RefCell<AssetStore<Sound>>,
    particle_scripts: RefCell<AssetStore<ParticleScript>>,
    binary_blobs: RefCell<AssetStore<BinaryBlob>>,
}

/// Generates `create_k`/`get_k`/`get_k_mut`/`find_k` for one asset kind.
/// `get_k`/`get_k_mut` search this manager's own store first, then defer to
/// the parent on miss (spec §4.3 "get(id) ... falls back to parent on
/// miss"); `find_k` does the same by name, but additionally adopts a
/// parent hit by cloning the payload into this manager's own store under a
/// fresh local handle, since two stores never share a `Pool` and a handle
/// minted in one cannot be re-inserted at a caller-chosen slot in another.
macro_rules! asset_kind_accessors {
    ($store:ident, $ty:ty, $create:ident, $get:ident, $get_mut:ident, $find:ident) => {
        pub fn $create(&self, name: impl Into<String>, payload: $ty) -> Handle<$ty> {
            self.$store.borrow_mut().create(name, payload)
        }

        pub fn $get(&self, handle: Handle<$ty>) -> EngineResult<Ref<'_, $ty>> {
            if self.$store.borrow().get(handle).is_ok() {
                return Ok(Ref::map(self.$store.borrow(), |s| s.get(handle).unwrap()));
            }
            self.parent
                .ok_or(EngineError::NotFound)
                .and_then(|parent| parent.$get(handle))
        }

        pub fn $get_mut(&self, handle: Handle<$ty>) -> EngineResult<RefMut<'_, $ty>> {
            if self.$store.borrow().get(handle).is_ok() {
                return Ok(RefMut::map(self.$store.borrow_mut(), |s| s.get_mut(handle).unwrap()));
            }
            self.parent
                .ok_or(EngineError::NotFound)
                .and_then(|parent| parent.$get_mut(handle))
        }

        pub fn $find(&self, name: &str) -> Option<Handle<$ty>> {
            if let Some(handle) = self.$store.borrow().find(name) {
                return Some(handle);
            }
            let parent = self.parent?;
            let parent_handle = parent.$store.borrow().find(name)?;
            let adopted = parent.$store.borrow().get(parent_handle).ok()?.clone();
            Some(self.$store.borrow_mut().create(name, adopted))
        }
    };
}

impl<'p> AssetManager<'p> {
    /// A manager with no parent. Only the base manager (the root of the
    /// tree) creates the built-in fallback textures.
    pub fn new_base() -> Self {
        let manager = Self::empty(None);
        manager.install_fallback_textures();
        manager
    }

    /// A child manager, deferring unresolved lookups to `parent`.
    pub fn new_child(parent: &'p AssetManager<'p>) -> Self {
        Self::empty(Some(parent))
    }

    fn empty(parent: Option<&'p AssetManager<'p>>) -> Self {
        Self {
            parent,
            meshes: RefCell::new(AssetStore::new()),
            materials: RefCell::new(AssetStore::new()),
            textures: RefCell::new(AssetStore::new()),
            fonts: RefCell::new(AssetStore::new()),
            sounds: RefCell::new(AssetStore::new()),
            particle_scripts: RefCell::new(AssetStore::new()),
            binary_blobs: RefCell::new(AssetStore::new()),
        }
    }

    fn install_fallback_textures(&self) {
        let white = self.textures.borrow_mut().create(FALLBACK_WHITE, Texture::solid_color(1, [255, 255, 255]));
        self.textures.borrow_mut().set_gc(white, GcMethod::Never).ok();
        let black = self.textures.borrow_mut().create(FALLBACK_BLACK, Texture::solid_color(1, [0, 0, 0]));
        self.textures.borrow_mut().set_gc(black, GcMethod::Never).ok();
        let checkerboard = self.textures.borrow_mut().create(
            FALLBACK_CHECKERBOARD,
            Texture::checkerboard(8, [255, 0, 255], [0, 0, 0]),
        );
        self.textures.borrow_mut().set_gc(checkerboard, GcMethod::Never).ok();
    }

    pub fn fallback_white(&self) -> Handle<Texture> {
        self.base().textures.borrow().find(FALLBACK_WHITE).expect("base manager installs fallback textures")
    }

    pub fn fallback_black(&self) -> Handle<Texture> {
        self.base().textures.borrow().find(FALLBACK_BLACK).expect("base manager installs fallback textures")
    }

    pub fn fallback_checkerboard(&self) -> Handle<Texture> {
        self.base()
            .textures
            .borrow()
            .find(FALLBACK_CHECKERBOARD)
            .expect("base manager installs fallback textures")
    }

    fn base(&self) -> &AssetManager<'p> {
        let mut current = self;
        while let Some(parent) = current.parent {
            current = parent;
        }
        current
    }

    pub fn is_base(&self) -> bool {
        self.parent.is_none()
    }

    asset_kind_accessors!(meshes, Mesh, create_mesh, get_mesh, get_mesh_mut, find_mesh);
    asset_kind_accessors!(
        materials,
        Material,
        create_material,
        get_material,
        get_material_mut,
        find_material
    );
    asset_kind_accessors!(
        textures,
        Texture,
        create_texture,
        get_texture,
        get_texture_mut,
        find_texture
    );
    asset_kind_accessors!(fonts, Font, create_font, get_font, get_font_mut, find_font);
    asset_kind_accessors!(sounds, Sound, create_sound, get_sound, get_sound_mut, find_sound);
    asset_kind_accessors!(
        particle_scripts,
        ParticleScript,
        create_particle_script,
        get_particle_script,
        get_particle_script_mut,
        find_particle_script
    );
    asset_kind_accessors!(
        binary_blobs,
        BinaryBlob,
        create_binary_blob,
        get_binary_blob,
        get_binary_blob_mut,
        find_binary_blob
    );

    pub fn destroy_mesh(&self, handle: Handle<Mesh>) {
        self.meshes.borrow_mut().destroy(handle);
    }

    pub fn destroy_material(&self, handle: Handle<Material>) {
        self.materials.borrow_mut().destroy(handle);
    }

    pub fn destroy_texture(&self, handle: Handle<Texture>) {
        self.textures.borrow_mut().destroy(handle);
    }

    /// Runs GC across every kind this manager owns. Does not recurse into
    /// the parent - each manager in the tree is updated independently by
    /// whatever drives the frame loop (spec §5 "periodic asset GC pass").
    pub fn update(&self, eviction_delay: Duration) -> u32 {
        self.meshes.borrow_mut().update(eviction_delay)
            + self.materials.borrow_mut().update(eviction_delay)
            + self.textures.borrow_mut().update(eviction_delay)
            + self.fonts.borrow_mut().update(eviction_delay)
            + self.sounds.borrow_mut().update(eviction_delay)
            + self.particle_scripts.borrow_mut().update(eviction_delay)
            + self.binary_blobs.borrow_mut().update(eviction_delay)
    }

    pub fn destroy_all(&self) {
        self.meshes.borrow_mut().destroy_all();
        self.materials.borrow_mut().destroy_all();
        self.textures.borrow_mut().destroy_all();
        self.fonts.borrow_mut().destroy_all();
        self.sounds.borrow_mut().destroy_all();
        self.particle_scripts.borrow_mut().destroy_all();
        self.binary_blobs.borrow_mut().destroy_all();
    }
}
