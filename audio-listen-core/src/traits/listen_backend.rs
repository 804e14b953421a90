use crate::models::device::{AudioEndpoint, ListenSettings};
use crate::models::error::ListenError;

/// A resolved capture endpoint whose listen settings can be read and written.
///
/// Implemented by `MmDeviceControl` in `audio-listen-windows`, which holds
/// the underlying `IMMDevice`. Handles are not `Send`: they stay on the
/// thread that created their backend, matching COM apartment rules.
pub trait ListenControl {
    /// Endpoint ID, friendly name, and default-device flag.
    fn info(&self) -> AudioEndpoint;

    /// Whether the "Listen to this device" checkbox is set.
    fn is_listening(&self) -> Result<bool, ListenError>;

    /// Both listen properties (checkbox and output target).
    fn listen_settings(&self) -> Result<ListenSettings, ListenError>;

    /// Write the checkbox and the output target in one go.
    ///
    /// `output_device_id` is the endpoint ID of a render device;
    /// `None` routes to the default playback device.
    fn set_listen(&self, enable: bool, output_device_id: Option<&str>) -> Result<(), ListenError>;
}

/// Platform backend that resolves friendly names to listen controls.
///
/// Lookup is an exact-match linear scan over active capture endpoints.
pub trait ListenBackend {
    /// Resolve a capture endpoint by its friendly name.
    fn resolve(&self, device_name: &str) -> Result<Box<dyn ListenControl>, ListenError>;

    /// List active capture endpoints.
    fn list_inputs(&self) -> Result<Vec<AudioEndpoint>, ListenError>;
}
