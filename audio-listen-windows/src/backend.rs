//! Capture endpoint enumeration and friendly-name lookup via the MMDevice API.

use windows::core::PWSTR;
use windows::Win32::Devices::FunctionDiscovery::PKEY_Device_FriendlyName;
use windows::Win32::Media::Audio::{
    eCapture, eConsole, eRender, EDataFlow, IMMDevice, IMMDeviceEnumerator, MMDeviceEnumerator,
    DEVICE_STATE_ACTIVE,
};
use windows::Win32::System::Com::{CoCreateInstance, CoTaskMemFree, CLSCTX_ALL, STGM_READ};

use audio_listen_core::{AudioEndpoint, ListenBackend, ListenControl, ListenError};

use crate::com::ComSession;
use crate::device::MmDeviceControl;

/// MMDevice-backed implementation of [`ListenBackend`].
///
/// Lookup is a linear scan over active capture endpoints, comparing
/// `PKEY_Device_FriendlyName` values exactly. Endpoints whose friendly name
/// cannot be read are skipped.
pub struct MmDeviceBackend {
    enumerator: IMMDeviceEnumerator,
    // Declared last: the enumerator and any resolved device must be
    // released before COM is uninitialized.
    _com: ComSession,
}

impl MmDeviceBackend {
    /// Initialize COM (MTA) and create the device enumerator.
    pub fn new() -> Result<Self, ListenError> {
        let com = ComSession::new()?;
        let enumerator: IMMDeviceEnumerator =
            unsafe { CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL) }.map_err(|e| {
                ListenError::ComInit(format!("failed to create device enumerator: {e}"))
            })?;
        Ok(Self {
            enumerator,
            _com: com,
        })
    }

    /// List active render (playback) endpoints, e.g. to pick a listen target.
    pub fn list_outputs(&self) -> Result<Vec<AudioEndpoint>, ListenError> {
        self.list_endpoints(eRender)
    }

    fn list_endpoints(&self, flow: EDataFlow) -> Result<Vec<AudioEndpoint>, ListenError> {
        unsafe {
            let collection = self
                .enumerator
                .EnumAudioEndpoints(flow, DEVICE_STATE_ACTIVE)
                .map_err(|e| ListenError::Enumeration(format!("EnumAudioEndpoints failed: {e}")))?;

            let count = collection
                .GetCount()
                .map_err(|e| ListenError::Enumeration(format!("GetCount failed: {e}")))?;

            let default_id = self.default_endpoint_id(flow);

            let mut endpoints = Vec::new();
            for i in 0..count {
                let Ok(device) = collection.Item(i) else {
                    continue;
                };
                let Ok(id) = device_id(&device) else {
                    continue;
                };
                let Some(name) = friendly_name(&device) else {
                    log::debug!("skipping endpoint {id}: friendly name not readable");
                    continue;
                };
                let is_default = default_id.as_deref() == Some(id.as_str());
                endpoints.push(AudioEndpoint {
                    id,
                    name,
                    is_default,
                });
            }
            Ok(endpoints)
        }
    }

    fn find_capture_device(
        &self,
        device_name: &str,
    ) -> Result<(IMMDevice, AudioEndpoint), ListenError> {
        unsafe {
            let collection = self
                .enumerator
                .EnumAudioEndpoints(eCapture, DEVICE_STATE_ACTIVE)
                .map_err(|e| ListenError::Enumeration(format!("EnumAudioEndpoints failed: {e}")))?;

            let count = collection
                .GetCount()
                .map_err(|e| ListenError::Enumeration(format!("GetCount failed: {e}")))?;

            let default_id = self.default_endpoint_id(eCapture);

            for i in 0..count {
                let Ok(device) = collection.Item(i) else {
                    continue;
                };
                let Some(name) = friendly_name(&device) else {
                    continue;
                };
                if name != device_name {
                    continue;
                }

                let id = device_id(&device)?;
                let is_default = default_id.as_deref() == Some(id.as_str());
                let info = AudioEndpoint {
                    id,
                    name,
                    is_default,
                };
                return Ok((device, info));
            }
            Err(ListenError::DeviceNotFound(device_name.to_owned()))
        }
    }

    fn default_endpoint_id(&self, flow: EDataFlow) -> Option<String> {
        unsafe {
            self.enumerator
                .GetDefaultAudioEndpoint(flow, eConsole)
                .ok()
                .and_then(|device| device_id(&device).ok())
        }
    }
}

impl ListenBackend for MmDeviceBackend {
    fn resolve(&self, device_name: &str) -> Result<Box<dyn ListenControl>, ListenError> {
        let (device, info) = self.find_capture_device(device_name)?;
        Ok(Box::new(MmDeviceControl::new(device, info)))
    }

    fn list_inputs(&self) -> Result<Vec<AudioEndpoint>, ListenError> {
        self.list_endpoints(eCapture)
    }
}

/// Read (and free) the endpoint ID string of a device.
fn device_id(device: &IMMDevice) -> Result<String, ListenError> {
    unsafe {
        let ptr: PWSTR = device
            .GetId()
            .map_err(|e| ListenError::Enumeration(format!("GetId failed: {e}")))?;
        let id = pwstr_to_string(ptr);
        CoTaskMemFree(Some(ptr.0 as *const _));
        Ok(id)
    }
}

/// Read `PKEY_Device_FriendlyName` from a device's property store.
fn friendly_name(device: &IMMDevice) -> Option<String> {
    unsafe {
        let store = device.OpenPropertyStore(STGM_READ).ok()?;
        let value = store.GetValue(&PKEY_Device_FriendlyName).ok()?;
        let name = value.to_string();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

fn pwstr_to_string(ptr: PWSTR) -> String {
    unsafe {
        if ptr.0.is_null() {
            return String::new();
        }
        let len = (0..).take_while(|&i| *ptr.0.add(i) != 0).count();
        String::from_utf16_lossy(std::slice::from_raw_parts(ptr.0, len))
    }
}
