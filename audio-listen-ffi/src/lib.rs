//! # audio-listen-ffi
//!
//! C ABI over a process-global [`InputListenController`], keeping the
//! exported names of the original `WindowsAudioInputsController` DLL so
//! existing hosts load this library unchanged.
//!
//! Call order: `Init` first, then any number of queries/toggles, then
//! `Terminate`. Before `Init` (or after `Terminate`) every function returns
//! `false` or null. `Terminate` releases the controller and with it the
//! cached device handles and the COM session.
//!
//! The ABI keeps the original DLL's single-threaded contract: hosts
//! serialize all calls on one thread.
//!
//! [`InputListenController`]: audio_listen_core::InputListenController

#[cfg(target_os = "windows")]
mod api {
    #![allow(non_snake_case)]

    use std::ffi::{c_char, CStr, CString};

    use parking_lot::Mutex;

    use audio_listen_core::InputListenController;
    use audio_listen_windows::MmDeviceBackend;

    struct FfiState {
        controller: InputListenController<MmDeviceBackend>,
        // Backing storage for the pointer handed out by `GetErrors`.
        errors: CString,
    }

    // SAFETY: the exported ABI keeps the original DLL's single-threaded
    // contract, so the COM handles inside the controller never actually
    // cross threads. The Mutex only satisfies the static's Sync bound.
    unsafe impl Send for FfiState {}

    static STATE: Mutex<Option<FfiState>> = Mutex::new(None);

    unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
        if ptr.is_null() {
            return None;
        }
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }

    /// Create the global controller. Must be called before any other call.
    #[no_mangle]
    pub extern "C" fn Init() {
        let controller = audio_listen_windows::new_controller();
        *STATE.lock() = Some(FfiState {
            controller,
            errors: CString::default(),
        });
    }

    /// Whether listening is enabled for the named capture device.
    ///
    /// # Safety
    /// `device_name` must be null or a valid NUL-terminated C string.
    #[no_mangle]
    pub unsafe extern "C" fn IsListening(device_name: *const c_char) -> bool {
        let Some(name) = cstr_to_string(device_name) else {
            return false;
        };
        match STATE.lock().as_mut() {
            Some(state) => state.controller.is_listening(&name),
            None => false,
        }
    }

    /// Enable/disable listening to the given audio input through the
    /// default audio output (e.g. listen to a microphone on the speakers).
    ///
    /// Returns `false` if the device was not found or the write failed.
    ///
    /// # Safety
    /// `device_name` must be null or a valid NUL-terminated C string.
    #[no_mangle]
    pub unsafe extern "C" fn SetListenToAudioInputDevice(
        device_name: *const c_char,
        listen: bool,
    ) -> bool {
        let Some(name) = cstr_to_string(device_name) else {
            return false;
        };
        match STATE.lock().as_mut() {
            Some(state) => state.controller.set_listen(&name, listen),
            None => false,
        }
    }

    /// Whether any operation since `Init` has failed.
    #[no_mangle]
    pub extern "C" fn HasError() -> bool {
        STATE
            .lock()
            .as_ref()
            .map(|state| state.controller.has_error())
            .unwrap_or(false)
    }

    /// The accumulated error log as a NUL-terminated string.
    ///
    /// The pointer stays valid until the next FFI call; null before `Init`.
    #[no_mangle]
    pub extern "C" fn GetErrors() -> *const c_char {
        let mut guard = STATE.lock();
        match guard.as_mut() {
            Some(state) => {
                // Log lines come from UTF-8 device names and error text;
                // an interior NUL falls back to an empty log.
                state.errors =
                    CString::new(state.controller.errors()).unwrap_or_default();
                state.errors.as_ptr()
            }
            None => std::ptr::null(),
        }
    }

    /// Drop the global controller, releasing cached handles and COM.
    #[no_mangle]
    pub extern "C" fn Terminate() {
        *STATE.lock() = None;
    }
}

#[cfg(all(test, target_os = "windows"))]
mod tests {
    use std::ffi::CString;

    use super::api::{
        GetErrors, HasError, Init, IsListening, SetListenToAudioInputDevice, Terminate,
    };

    // Every export goes through the shared global state, so the before/after
    // assertions have to run in sequence inside one test.
    #[test]
    fn calls_fail_soft_before_init_and_after_terminate() {
        let name = CString::new("Microphone (USB Audio)").unwrap();

        // before Init: queries and toggles return false, the log is null
        unsafe {
            assert!(!IsListening(name.as_ptr()));
            assert!(!SetListenToAudioInputDevice(name.as_ptr(), true));
        }
        assert!(!HasError());
        assert!(GetErrors().is_null());

        Init();
        // the log pointer is live once a controller exists, even when empty
        assert!(!GetErrors().is_null());
        // a null device name fails soft regardless of state
        unsafe {
            assert!(!IsListening(std::ptr::null()));
        }

        Terminate();
        unsafe {
            assert!(!IsListening(name.as_ptr()));
            assert!(!SetListenToAudioInputDevice(name.as_ptr(), false));
        }
        assert!(!HasError());
        assert!(GetErrors().is_null());
    }
}
