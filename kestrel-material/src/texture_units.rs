//! `textures_enabled` bitmask over the fixed-function texture units
//! (spec §4.4) plus the four named map slots a pass exposes.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct TextureUnits: u8 {
        const DIFFUSE  = 0b0001;
        const LIGHT    = 0b0010;
        const NORMAL   = 0b0100;
        const SPECULAR = 0b1000;
    }
}

impl Default for TextureUnits {
    fn default() -> Self {
        TextureUnits::empty()
    }
}
