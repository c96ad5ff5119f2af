use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext};

use crate::error::AppError;

/// WebGL2 context shared by the desktop preview and the XR layer
pub struct GlContext {
    pub gl: WebGl2RenderingContext,
    pub canvas: HtmlCanvasElement,
}

impl GlContext {
    /// Create the context on `canvas`, asking for xr-compatibility up front.
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, AppError> {
        let options = js_sys::Object::new();
        js_sys::Reflect::set(&options, &JsValue::from_str("antialias"), &JsValue::TRUE)?;
        js_sys::Reflect::set(&options, &JsValue::from_str("xrCompatible"), &JsValue::TRUE)?;

        let gl = canvas
            .get_context_with_context_options("webgl2", &options)?
            .ok_or_else(|| AppError::Gl("WebGL2 is not available".to_string()))?
            .dyn_into::<WebGl2RenderingContext>()
            .map_err(|_| AppError::Gl("context is not a WebGL2RenderingContext".to_string()))?;

        gl.enable(WebGl2RenderingContext::DEPTH_TEST);
        gl.enable(WebGl2RenderingContext::CULL_FACE);

        tracing::info!(width = canvas.width(), height = canvas.height(), "WebGL2 context created");
        Ok(Self {
            gl,
            canvas: canvas.clone(),
        })
    }

    /// Required before an `XRWebGLLayer` can be created from this context.
    pub async fn make_xr_compatible(&self) -> Result<(), AppError> {
        JsFuture::from(self.gl.make_xr_compatible()).await?;
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    /// Returns `true` when the size actually changed.
    pub fn resize(&self, width: u32, height: u32) -> bool {
        if self.size() == (width, height) {
            return false;
        }
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        true
    }
}
