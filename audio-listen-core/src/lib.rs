//! # audio-listen-core
//!
//! Platform-agnostic core of audio-listen-kit.
//!
//! Models the Windows "Listen to this device" setting (route a capture
//! endpoint, e.g. a microphone, to a playback device) and provides the
//! name-keyed controller that callers drive. Platform backends implement
//! the [`ListenBackend`] trait; the MMDevice implementation lives in
//! `audio-listen-windows`.
//!
//! ## Architecture
//!
//! ```text
//! audio-listen-core (this crate)
//! ├── traits/      ← ListenBackend, ListenControl
//! ├── models/      ← ListenError, AudioEndpoint, ListenSettings
//! └── controller   ← InputListenController (handle cache + error log)
//! ```

pub mod controller;
pub mod models;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use controller::InputListenController;
pub use models::device::{AudioEndpoint, ListenSettings};
pub use models::error::ListenError;
pub use traits::listen_backend::{ListenBackend, ListenControl};
