use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlButtonElement, MouseEvent, Window};

use crate::error::AppError;

const BUTTON_STYLE: &str = "position:absolute;right:20px;bottom:20px;padding:12px 24px;\
border:2px solid #fff;border-radius:4px;background:rgba(0,0,0,0.6);color:#fff;\
font:bold 16px sans-serif;cursor:pointer;";

/// Blocking user-visible notice.
pub fn notify(window: &Window, message: &str) {
    if let Err(e) = window.alert_with_message(message) {
        tracing::error!(?e, "alert failed");
    }
}

/// Overlay button that starts the immersive session
pub struct EnterXrButton {
    button: HtmlButtonElement,
    _on_click: Closure<dyn FnMut(MouseEvent)>,
}

impl EnterXrButton {
    pub fn new(document: &Document, label: &str, on_click: impl FnMut() + 'static) -> Result<Self, AppError> {
        let body = document
            .body()
            .ok_or_else(|| AppError::Js("no body on document".to_string()))?;
        let button = document
            .create_element("button")?
            .dyn_into::<HtmlButtonElement>()
            .map_err(|_| AppError::Js("failed to create button".to_string()))?;
        button.set_text_content(Some(label));
        button.set_attribute("style", BUTTON_STYLE)?;

        let mut on_click = on_click;
        let click = Closure::wrap(Box::new(move |e: MouseEvent| {
            e.prevent_default();
            on_click();
        }) as Box<dyn FnMut(MouseEvent)>);
        button.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
        body.append_child(&button)?;

        Ok(Self {
            button,
            _on_click: click,
        })
    }

    /// Disabled while a session is running or being requested.
    pub fn set_enabled(&self, enabled: bool) {
        self.button.set_disabled(!enabled);
        let style = if enabled { BUTTON_STYLE.to_string() } else { format!("{BUTTON_STYLE}opacity:0.4;") };
        if let Err(e) = self.button.set_attribute("style", &style) {
            tracing::warn!(?e, "failed to restyle button");
        }
    }
}
