use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// WebXR session modes, named by their wire strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Inline,
    ImmersiveVr,
    ImmersiveAr,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Inline => "inline",
            SessionMode::ImmersiveVr => "immersive-vr",
            SessionMode::ImmersiveAr => "immersive-ar",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inline" => Ok(SessionMode::Inline),
            "immersive-vr" => Ok(SessionMode::ImmersiveVr),
            "immersive-ar" => Ok(SessionMode::ImmersiveAr),
            other => Err(AppError::UnknownSessionMode(other.to_string())),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl From<SessionMode> for web_sys::XrSessionMode {
    fn from(mode: SessionMode) -> Self {
        match mode {
            SessionMode::Inline => web_sys::XrSessionMode::Inline,
            SessionMode::ImmersiveVr => web_sys::XrSessionMode::ImmersiveVr,
            SessionMode::ImmersiveAr => web_sys::XrSessionMode::ImmersiveAr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_strings() {
        for mode in [SessionMode::Inline, SessionMode::ImmersiveVr, SessionMode::ImmersiveAr] {
            assert_eq!(mode.as_str().parse::<SessionMode>().unwrap(), mode);
        }
        assert_eq!(SessionMode::ImmersiveVr.to_string(), "immersive-vr");
    }

    #[test]
    fn test_unknown_mode() {
        assert!(matches!(
            "immersive-xr".parse::<SessionMode>(),
            Err(AppError::UnknownSessionMode(m)) if m == "immersive-xr"
        ));
    }
}
