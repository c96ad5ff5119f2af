// VIEW: WebGL2 rendering for the canvas preview and the XR layer
pub mod render;
pub mod gl_init;

pub use render::RenderState;
pub use gl_init::GlContext;
