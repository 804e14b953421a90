//! Listen control over a resolved MMDevice capture endpoint.

use windows::Win32::Media::Audio::IMMDevice;
use windows::Win32::System::Com::{STGM, STGM_READ, STGM_READWRITE};
use windows::Win32::UI::Shell::PropertiesSystem::IPropertyStore;

use audio_listen_core::{AudioEndpoint, ListenControl, ListenError, ListenSettings};

use crate::listen_properties;

/// A capture endpoint resolved by [`MmDeviceBackend`](crate::MmDeviceBackend).
///
/// Holds the `IMMDevice` for the endpoint; the COM reference is released on
/// drop. Reads open the property store `STGM_READ`; writes open it
/// `STGM_READWRITE`, which can fail with access denied in unprivileged
/// contexts on some systems.
pub struct MmDeviceControl {
    device: IMMDevice,
    info: AudioEndpoint,
}

impl MmDeviceControl {
    pub(crate) fn new(device: IMMDevice, info: AudioEndpoint) -> Self {
        Self { device, info }
    }

    fn open_store(&self, access: STGM) -> windows::core::Result<IPropertyStore> {
        unsafe { self.device.OpenPropertyStore(access) }
    }
}

impl ListenControl for MmDeviceControl {
    fn info(&self) -> AudioEndpoint {
        self.info.clone()
    }

    fn is_listening(&self) -> Result<bool, ListenError> {
        Ok(self.listen_settings()?.enabled)
    }

    fn listen_settings(&self) -> Result<ListenSettings, ListenError> {
        let store = self.open_store(STGM_READ).map_err(|e| {
            ListenError::PropertyRead(format!("open property store for '{}': {e}", self.info.name))
        })?;
        listen_properties::read_settings(&store)
    }

    fn set_listen(&self, enable: bool, output_device_id: Option<&str>) -> Result<(), ListenError> {
        let store = self.open_store(STGM_READWRITE).map_err(|e| {
            ListenError::PropertyWrite(format!(
                "open property store for '{}': {e}",
                self.info.name
            ))
        })?;
        listen_properties::write_settings(&store, enable, output_device_id)?;
        log::info!(
            "listen {} for '{}' (output: {})",
            if enable { "enabled" } else { "disabled" },
            self.info.name,
            output_device_id.unwrap_or("default playback device"),
        );
        Ok(())
    }
}
