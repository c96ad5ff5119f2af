// Re-export all public modules
pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

// MVC Architecture
pub mod model;
pub mod controller;
#[cfg(target_arch = "wasm32")]
pub mod view;

// Browser-only surfaces
#[cfg(target_arch = "wasm32")]
pub mod ui;
#[cfg(target_arch = "wasm32")]
pub mod xr;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

// Common imports
#[cfg(target_arch = "wasm32")]
use {
    std::cell::RefCell,
    std::rc::Rc,
    wasm_bindgen::closure::Closure,
    wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue},
    web_sys::{Document, Event, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window},
    controller::{input::wasm as input_wasm, FrameLoopContext, InputEvent},
    view::{GlContext, RenderState},
};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    logging::init();
    let config = AppConfig::default();
    let (window, document, canvas) = init_canvas(&config)?;
    setup_app(&window, &document, &canvas, &config).await?;
    Ok(())
}

/// Main application setup for WASM
#[cfg(target_arch = "wasm32")]
async fn setup_app(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
    config: &AppConfig,
) -> Result<(), AppError> {
    let gl = Rc::new(GlContext::new(canvas)?);
    let renderer = Rc::new(RenderState::new(&gl.gl, &utils::create_box_mesh(), config.clear_color)?);

    let ctx = Rc::new(RefCell::new(FrameLoopContext::new(config)?));
    {
        let (width, height) = gl.size();
        ctx.borrow_mut().resize(width, height);
    }

    setup_input_listeners(document, window, canvas, ctx.clone())?;
    setup_resize_listener(window, gl.clone(), ctx.clone())?;

    // Desktop preview using requestAnimationFrame; idle while an immersive session owns the display
    let f = RcCellCallback::new(window.clone(), {
        let window = window.clone();
        let gl = gl.clone();
        let renderer = renderer.clone();
        let ctx = ctx.clone();

        move || {
            let mut frame_ctx = ctx.borrow_mut();
            if frame_ctx.xr_active {
                return;
            }
            let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
            frame_ctx.update_preview(now);

            let (width, height) = gl.size();
            renderer.begin_frame(&gl.gl, None, width as i32, height as i32);
            renderer.draw_scene(
                &gl.gl,
                &frame_ctx.scene,
                frame_ctx.camera.view_proj(),
                [0, 0, width as i32, height as i32],
            );
        }
    });
    f.start()?;

    // Unsupported leaves controller tracking off; the preview keeps running
    if xr::XrExperience::create(window, gl, renderer, ctx, config.session_mode)
        .await?
        .is_none()
    {
        tracing::info!("continuing without XR");
    }

    Ok(())
}

/// Keyboard and mouse listeners driving the preview camera
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    document: &Document,
    window: &Window,
    canvas: &HtmlCanvasElement,
    ctx: Rc<RefCell<FrameLoopContext>>,
) -> Result<(), AppError> {
    // Keyboard down
    {
        let ctx = ctx.clone();
        let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            let mut frame_ctx = ctx.borrow_mut();
            if frame_ctx.camera_controller.processor().is_navigation_key(&e.key()) {
                e.prevent_default();
            }
            frame_ctx.handle_input(&input_wasm::keyboard_event_to_input(&e, true));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
    }

    // Keyboard up
    {
        let ctx = ctx.clone();
        let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            ctx.borrow_mut().handle_input(&input_wasm::keyboard_event_to_input(&e, false));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
        keyup.forget();
    }

    // Focus loss - clear all keys
    {
        let ctx = ctx.clone();
        let blur = Closure::wrap(Box::new(move |_e: Event| {
            ctx.borrow_mut().handle_input(&InputEvent::FocusLost);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
        blur.forget();
    }

    // Visibility change - clear all keys
    {
        let ctx = ctx.clone();
        let doc = document.clone();
        let visibility = Closure::wrap(Box::new(move |_e: Event| {
            ctx.borrow_mut()
                .handle_input(&InputEvent::VisibilityChanged { visible: !doc.hidden() });
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
        visibility.forget();
    }

    // Drag to look: press on the canvas, release anywhere
    {
        let ctx = ctx.clone();
        let mousedown = Closure::wrap(Box::new(move |e: MouseEvent| {
            ctx.borrow_mut().handle_input(&input_wasm::mouse_button_to_input(&e, true));
            e.prevent_default();
        }) as Box<dyn FnMut(MouseEvent)>);
        canvas.add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
        mousedown.forget();
    }
    {
        let ctx = ctx.clone();
        let mouseup = Closure::wrap(Box::new(move |e: MouseEvent| {
            ctx.borrow_mut().handle_input(&input_wasm::mouse_button_to_input(&e, false));
        }) as Box<dyn FnMut(MouseEvent)>);
        document.add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
        mouseup.forget();
    }
    {
        let mm = Closure::wrap(Box::new(move |e: MouseEvent| {
            ctx.borrow_mut().handle_input(&input_wasm::mouse_move_to_input(&e));
        }) as Box<dyn FnMut(MouseEvent)>);
        document.add_event_listener_with_callback("mousemove", mm.as_ref().unchecked_ref())?;
        mm.forget();
    }

    Ok(())
}

/// Keep the canvas, the GL viewport and the camera aspect in step with the window.
#[cfg(target_arch = "wasm32")]
fn setup_resize_listener(window: &Window, gl: Rc<GlContext>, ctx: Rc<RefCell<FrameLoopContext>>) -> Result<(), AppError> {
    let window_for_size = window.clone();
    let apply = move || {
        let Some((width, height)) = window_size(&window_for_size) else {
            return;
        };
        if gl.resize(width, height) {
            ctx.borrow_mut().resize(width, height);
            tracing::debug!(width, height, "canvas resized");
        }
    };
    apply();

    let resize = Closure::wrap(Box::new(move |_e: Event| apply()) as Box<dyn FnMut(Event)>);
    window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
    resize.forget();
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn window_size(window: &Window) -> Option<(u32, u32)> {
    let w = window.inner_width().ok()?.as_f64()? as u32;
    let h = window.inner_height().ok()?.as_f64()? as u32;
    (w > 0 && h > 0).then_some((w, h))
}

#[cfg(target_arch = "wasm32")]
fn init_canvas(config: &AppConfig) -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
    let window = web_sys::window().ok_or(js_error("no global `window`"))?;
    let document = window.document().ok_or(js_error("no document on window"))?;
    let body = document.body().ok_or(js_error("no body on document"))?;
    let canvas_el = match document.get_element_by_id("canvas") {
        Some(el) => el
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| js_error("#canvas is not a canvas"))?,
        None => {
            let el = document
                .create_element("canvas")?
                .dyn_into::<HtmlCanvasElement>()
                .map_err(|_| js_error("failed to create canvas"))?;
            el.set_id("canvas");
            body.append_child(&el)?;
            el
        }
    };
    canvas_el.set_width(config.canvas_width);
    canvas_el.set_height(config.canvas_height);
    Ok((window, document, canvas_el))
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}

#[cfg(target_arch = "wasm32")]
struct RcCellCallback {
    inner: Rc<RefCell<Box<dyn FnMut()>>>,
    window: Window,
}

#[cfg(target_arch = "wasm32")]
impl RcCellCallback {
    fn new(window: Window, f: impl FnMut() + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(f))),
            window,
        }
    }

    fn start(self) -> Result<(), AppError> {
        let inner = self.inner.clone();
        let window = self.window.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            inner.borrow_mut().as_mut()();

            // Recursively schedule next frame
            if let Some(cb) = callback_clone.borrow().as_ref() {
                if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!(error = %AppError::from(e), "requestAnimationFrame failed");
                }
            }
        }) as Box<dyn FnMut()>));

        if let Some(cb) = callback.borrow().as_ref() {
            self.window.request_animation_frame(cb.as_ref().unchecked_ref())?;
        }

        // The closure owns a handle to itself, so it lives as long as the page
        Ok(())
    }
}
