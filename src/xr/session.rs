use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Mat4;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Event, Window, XrFrame, XrInputSource, XrInputSourceEvent, XrInputSourcesChangeEvent,
    XrReferenceSpace, XrReferenceSpaceType, XrRenderStateInit, XrSession, XrSystem, XrView,
    XrWebGlLayer,
};

use crate::controller::{FrameLoopContext, InteractionOutcome, SessionMode};
use crate::error::AppError;
use crate::ui::{self, EnterXrButton};
use crate::view::{GlContext, RenderState};
use crate::xr::input::TrackedSources;

/// Immersive session lifecycle: support check, entry button, input wiring and the XR frame loop.
pub struct XrExperience {
    xr: XrSystem,
    mode: SessionMode,
    gl: Rc<GlContext>,
    renderer: Rc<RenderState>,
    ctx: Rc<RefCell<FrameLoopContext>>,
    sources: Rc<RefCell<TrackedSources>>,
    button: RefCell<Option<EnterXrButton>>,
    entering: Cell<bool>,
    /// Running XR frame callback; dropped when the session ends.
    frame_callback: RefCell<Option<Closure<dyn FnMut(f64, XrFrame)>>>,
}

impl XrExperience {
    /// Ask the browser whether `mode` is available. Unsupported shows the notice and returns `None`.
    pub async fn create(
        window: &Window,
        gl: Rc<GlContext>,
        renderer: Rc<RenderState>,
        ctx: Rc<RefCell<FrameLoopContext>>,
        mode: SessionMode,
    ) -> Result<Option<Rc<Self>>, AppError> {
        let navigator = window.navigator();
        let xr = js_sys::Reflect::has(&navigator, &JsValue::from_str("xr"))
            .unwrap_or(false)
            .then(|| navigator.xr());

        let supported = match &xr {
            Some(xr) => match JsFuture::from(xr.is_session_supported(mode.into())).await {
                Ok(value) => value.as_bool().unwrap_or(false),
                Err(e) => {
                    tracing::warn!(error = %AppError::from(e), "session support query failed");
                    false
                }
            },
            None => false,
        };

        let support = ctx
            .borrow_mut()
            .on_session_support(mode, supported, |msg| ui::notify(window, msg));
        let xr = match (support, xr) {
            (Ok(()), Some(xr)) => xr,
            (Err(AppError::SessionUnsupported(_)), _) | (Ok(()), None) => return Ok(None),
            (Err(e), _) => return Err(e),
        };

        let experience = Rc::new(Self {
            xr,
            mode,
            gl,
            renderer,
            ctx,
            sources: Rc::new(RefCell::new(TrackedSources::new())),
            button: RefCell::new(None),
            entering: Cell::new(false),
            frame_callback: RefCell::new(None),
        });

        let document = window
            .document()
            .ok_or_else(|| AppError::Js("no document on window".to_string()))?;
        // The button and the experience keep each other alive for the lifetime of the page
        let button = EnterXrButton::new(&document, "Enter VR", {
            let experience = experience.clone();
            move || experience.clone().request_enter()
        })?;
        *experience.button.borrow_mut() = Some(button);

        Ok(Some(experience))
    }

    fn set_button_enabled(&self, enabled: bool) {
        if let Some(button) = self.button.borrow().as_ref() {
            button.set_enabled(enabled);
        }
    }

    /// Called from the button's click handler, which counts as the user gesture the browser requires.
    fn request_enter(self: Rc<Self>) {
        if self.entering.get() || self.ctx.borrow().xr_active {
            return;
        }
        self.entering.set(true);
        self.set_button_enabled(false);

        // request_session must be issued synchronously inside the gesture
        let request = JsFuture::from(self.xr.request_session(self.mode.into()));
        spawn_local(async move {
            if let Err(e) = self.enter(request).await {
                tracing::error!(error = %e, "failed to enter XR session");
                self.set_button_enabled(true);
            }
            self.entering.set(false);
        });
    }

    async fn enter(self: &Rc<Self>, request: JsFuture) -> Result<(), AppError> {
        let session: XrSession = request
            .await?
            .dyn_into()
            .map_err(|_| AppError::Js("requestSession did not return an XRSession".to_string()))?;
        tracing::info!(mode = %self.mode, "XR session granted");

        // Subscribe before awaiting anything else so no controller connect is missed
        self.install_handlers(&session);
        self.track_existing_sources(&session);

        match self.prepare_rendering(&session).await {
            Ok(space) => {
                self.ctx.borrow_mut().on_session_started();
                self.start_frame_loop(&session, space);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "XR setup failed, ending session");
                // The end handler resets controller state and the button
                let _ = session.end();
                Err(e)
            }
        }
    }

    async fn prepare_rendering(&self, session: &XrSession) -> Result<XrReferenceSpace, AppError> {
        self.gl.make_xr_compatible().await?;
        let layer = XrWebGlLayer::new_with_web_gl2_rendering_context(session, &self.gl.gl)?;
        let render_state = XrRenderStateInit::new();
        render_state.set_base_layer(Some(&layer));
        session.update_render_state_with_state(&render_state);

        request_reference_space(session).await
    }

    /// Controllers the runtime already reports when the session is granted.
    fn track_existing_sources(&self, session: &XrSession) {
        let current = session.input_sources();
        for i in 0..current.length() {
            let Some(source) = current.get(i) else {
                continue;
            };
            if let Some(event) = self.sources.borrow_mut().add(&source) {
                self.ctx.borrow_mut().handle_xr_input(&event);
            }
        }
    }

    fn install_handlers(self: &Rc<Self>, session: &XrSession) {
        // Controller connect / disconnect
        {
            let sources = self.sources.clone();
            let ctx = self.ctx.clone();
            let changed = Closure::wrap(Box::new(move |e: XrInputSourcesChangeEvent| {
                for source in e.added().iter().filter_map(|s| s.dyn_into::<XrInputSource>().ok()) {
                    if let Some(event) = sources.borrow_mut().add(&source) {
                        ctx.borrow_mut().handle_xr_input(&event);
                    }
                }
                for source in e.removed().iter().filter_map(|s| s.dyn_into::<XrInputSource>().ok()) {
                    if let Some(event) = sources.borrow_mut().remove(&source) {
                        ctx.borrow_mut().handle_xr_input(&event);
                    }
                }
            }) as Box<dyn FnMut(XrInputSourcesChangeEvent)>);
            session.set_oninputsourceschange(Some(changed.as_ref().unchecked_ref()));
            changed.forget();
        }

        // Primary action (trigger) state changes
        for pressed in [true, false] {
            let sources = self.sources.clone();
            let ctx = self.ctx.clone();
            let select = Closure::wrap(Box::new(move |e: XrInputSourceEvent| {
                if let Some(event) = sources.borrow().button_changed(&e.input_source(), pressed) {
                    ctx.borrow_mut().handle_xr_input(&event);
                }
            }) as Box<dyn FnMut(XrInputSourceEvent)>);
            if pressed {
                session.set_onselectstart(Some(select.as_ref().unchecked_ref()));
            } else {
                session.set_onselectend(Some(select.as_ref().unchecked_ref()));
            }
            select.forget();
        }

        // Session end
        {
            let experience = self.clone();
            let end = Closure::wrap(Box::new(move |_e: Event| {
                experience.frame_callback.borrow_mut().take();
                experience.sources.borrow_mut().clear();
                experience.ctx.borrow_mut().on_session_ended();
                experience.set_button_enabled(true);
            }) as Box<dyn FnMut(Event)>);
            session.set_onend(Some(end.as_ref().unchecked_ref()));
            end.forget();
        }
    }

    fn start_frame_loop(self: &Rc<Self>, session: &XrSession, space: XrReferenceSpace) {
        let experience = self.clone();

        let callback = Closure::wrap(Box::new(move |_time: f64, frame: XrFrame| {
            if !experience.ctx.borrow().xr_active {
                // Ends the loop and frees this closure once it returns
                experience.frame_callback.borrow_mut().take();
                return;
            }
            experience.xr_frame(&frame, &space);

            // Recursively schedule next frame
            if let Some(cb) = experience.frame_callback.borrow().as_ref() {
                frame.session().request_animation_frame(cb.as_ref().unchecked_ref());
            }
        }) as Box<dyn FnMut(f64, XrFrame)>);

        session.request_animation_frame(callback.as_ref().unchecked_ref());
        *self.frame_callback.borrow_mut() = Some(callback);
    }

    /// One immersive frame: controller interaction first, then one draw per eye.
    fn xr_frame(&self, frame: &XrFrame, space: &XrReferenceSpace) {
        let outcomes = {
            let sources = self.sources.borrow();
            self.ctx
                .borrow_mut()
                .update_controllers(|id| sources.pose(frame, space, id))
        };
        for (id, outcome) in outcomes {
            if !matches!(outcome, InteractionOutcome::Idle | InteractionOutcome::Moved { .. }) {
                tracing::debug!(?id, ?outcome, "controller interaction");
            }
        }

        let Some(viewer) = frame.get_viewer_pose(space) else {
            return;
        };
        let Some(layer) = frame.session().render_state().base_layer() else {
            return;
        };

        let gl = &self.gl.gl;
        let framebuffer = layer.framebuffer();
        self.renderer.begin_frame(
            gl,
            framebuffer.as_ref(),
            layer.framebuffer_width() as i32,
            layer.framebuffer_height() as i32,
        );

        let ctx = self.ctx.borrow();
        for view in viewer.views().iter().filter_map(|v| v.dyn_into::<XrView>().ok()) {
            let Some(viewport) = layer.get_viewport(&view) else {
                continue;
            };
            let proj = Mat4::from_cols_slice(&view.projection_matrix());
            let view_matrix = Mat4::from_cols_slice(&view.transform().inverse().matrix());
            self.renderer.draw_scene(
                gl,
                &ctx.scene,
                proj * view_matrix,
                [viewport.x(), viewport.y(), viewport.width(), viewport.height()],
            );
        }
    }
}

/// `local-floor` puts the origin on the floor; not every runtime offers it.
async fn request_reference_space(session: &XrSession) -> Result<XrReferenceSpace, AppError> {
    let space = match JsFuture::from(session.request_reference_space(XrReferenceSpaceType::LocalFloor)).await {
        Ok(space) => space,
        Err(e) => {
            tracing::warn!(error = %AppError::from(e), "local-floor unavailable, falling back to local");
            JsFuture::from(session.request_reference_space(XrReferenceSpaceType::Local)).await?
        }
    };
    space
        .dyn_into::<XrReferenceSpace>()
        .map_err(|_| AppError::Js("requestReferenceSpace did not return an XRReferenceSpace".to_string()))
}
