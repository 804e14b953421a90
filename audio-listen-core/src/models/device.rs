use serde::{Deserialize, Serialize};

/// An active audio endpoint, identified by its MMDevice endpoint ID and
/// the user-facing friendly name shown in the Sound control panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioEndpoint {
    pub id: String,
    pub name: String,
    pub is_default: bool,
}

/// The two listen-to-device properties of a capture endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenSettings {
    /// The "Listen to this device" checkbox.
    pub enabled: bool,

    /// Endpoint ID of the playback device audio is routed to.
    /// `None` means the default playback device.
    pub output_device_id: Option<String>,
}
