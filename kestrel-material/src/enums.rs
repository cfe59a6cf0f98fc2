//! Enumerated pipeline-state domains from spec §4.4's pass field table.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DepthFunc {
    Never,
    Less,
    Lequal,
    Equal,
    Gequal,
    Greater,
    Always,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AlphaFunc {
    Never,
    Less,
    Lequal,
    Equal,
    Gequal,
    Greater,
    Always,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlendFunc {
    None,
    Add,
    Alpha,
    Color,
    Modulate,
    OneOneMinusAlpha,
}

impl BlendFunc {
    /// Render-queue builder's blend-class test (spec §4.5): opaque is "no
    /// blend, or ADD with no alpha channel in play" - ADD is order
    /// independent, so the builder treats it as opaque for sort purposes.
    pub fn is_opaque_class(self) -> bool {
        matches!(self, BlendFunc::None | BlendFunc::Add)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CullMode {
    None,
    Front,
    Back,
    Both,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShadeModel {
    Flat,
    Smooth,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PolygonMode {
    Point,
    Line,
    Fill,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorMaterial {
    None,
    Ambient,
    Diffuse,
    AmbientAndDiffuse,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FogMode {
    None,
    Linear,
    Exp,
    Exp2,
}

/// Added per spec §4.5's "iteration tag": whether a pass draws once per
/// object or once per relevant light. Not spelled out as a field in §4.4's
/// table but required for the builder to emit the right iteration count.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PassIteration {
    Once,
    OncePerLight,
}

/// `{POINTS, LINES, LINE_STRIP, TRIANGLES, TRIANGLE_STRIP, TRIANGLE_FAN, QUADS}`
/// from spec §4.6 "Draw primitive mapping".
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DrawPrimitive {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
    Quads,
}
