// XR: WebXR session and input-source plumbing (browser only)
pub mod input;
pub mod session;

pub use input::TrackedSources;
pub use session::XrExperience;
