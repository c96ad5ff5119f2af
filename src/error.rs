use crate::controller::SessionMode;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("session mode '{0}' is not supported")]
    SessionUnsupported(SessionMode),
    #[error("unknown session mode '{0}'")]
    UnknownSessionMode(String),
    #[error("invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),
    #[error("shader error: {0}")]
    Shader(String),
    #[error("WebGL error: {0}")]
    Gl(String),
    #[error("JavaScript error: {0}")]
    Js(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use super::AppError;
    use wasm_bindgen::JsValue;

    impl From<JsValue> for AppError {
        fn from(value: JsValue) -> Self {
            let msg = value
                .as_string()
                .or_else(|| {
                    js_sys::Reflect::get(&value, &JsValue::from_str("message"))
                        .ok()
                        .and_then(|m| m.as_string())
                })
                .unwrap_or_else(|| format!("{value:?}"));
            AppError::Js(msg)
        }
    }

    impl From<AppError> for JsValue {
        fn from(err: AppError) -> Self {
            JsValue::from_str(&err.to_string())
        }
    }
}
