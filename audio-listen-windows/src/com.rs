use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_MULTITHREADED};

use audio_listen_core::ListenError;

/// Scoped COM initialization for the thread that owns the backend.
///
/// `S_FALSE` (COM already initialized on this thread) still requires a
/// balancing `CoUninitialize`, so the guard uninitializes unconditionally.
pub(crate) struct ComSession;

impl ComSession {
    pub(crate) fn new() -> Result<Self, ListenError> {
        unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) }
            .ok()
            .map_err(|e| ListenError::ComInit(e.to_string()))?;
        Ok(Self)
    }
}

impl Drop for ComSession {
    fn drop(&mut self) {
        unsafe {
            CoUninitialize();
        }
    }
}
