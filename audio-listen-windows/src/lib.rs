//! # audio-listen-windows
//!
//! Windows MMDevice backend for audio-listen-kit.
//!
//! Provides:
//! - `MmDeviceBackend` — capture endpoint enumeration and friendly-name lookup
//! - `MmDeviceControl` — listen-settings reads/writes on a resolved endpoint
//! - `listen_properties` — the two `PROPERTYKEY`s backing "Listen to this device"
//!
//! ## Threading
//! The backend owns a COM session; create it on the thread all listen
//! operations run on and keep it there. Handles it resolves are not `Send`.
//!
//! ## Usage
//! ```ignore
//! let mut controller = audio_listen_windows::new_controller();
//! controller.set_listen("Microphone (HD Webcam C525)", true);
//! ```

#[cfg(target_os = "windows")]
pub mod backend;
#[cfg(target_os = "windows")]
mod com;
#[cfg(target_os = "windows")]
pub mod device;
#[cfg(target_os = "windows")]
pub mod listen_properties;

#[cfg(target_os = "windows")]
pub use backend::MmDeviceBackend;
#[cfg(target_os = "windows")]
pub use device::MmDeviceControl;

#[cfg(target_os = "windows")]
use audio_listen_core::InputListenController;

/// Build a controller over the MMDevice backend.
///
/// A failed backend init (COM or enumerator creation) still yields a usable
/// controller; the failure lands in its error log and every operation fails
/// soft, matching the original DLL behavior.
#[cfg(target_os = "windows")]
pub fn new_controller() -> InputListenController<MmDeviceBackend> {
    match MmDeviceBackend::new() {
        Ok(backend) => InputListenController::new(backend),
        Err(e) => {
            log::error!("MMDevice backend init failed: {e}");
            InputListenController::backend_failed(e)
        }
    }
}
