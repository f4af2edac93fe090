pub(crate) mod context;
pub(crate) mod mesh;
pub(crate) mod pipeline;
pub(crate) mod texture;
pub(crate) mod uniforms;
