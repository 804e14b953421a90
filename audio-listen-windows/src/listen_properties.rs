//! The two vendor-defined properties backing "Listen to this device".
//!
//! The audio endpoint builder stores listen settings in a private property
//! set on the capture endpoint's property store. The set is identified by
//! the format GUID `{24DBB0FC-9311-4B3D-9CF0-18FF155639D4}`; PID 1 is the
//! checkbox, PID 0 the target playback endpoint ID.

use windows::core::GUID;
use windows::Win32::System::Com::StructuredStorage::PROPVARIANT;
use windows::Win32::UI::Shell::PropertiesSystem::{IPropertyStore, PROPERTYKEY};

use audio_listen_core::{ListenError, ListenSettings};

const LISTEN_SETTINGS_FMTID: GUID = GUID::from_u128(0x24dbb0fc_9311_4b3d_9cf0_18ff155639d4);

/// The "Listen to this device" checkbox (`VT_BOOL`).
pub const PKEY_LISTEN_ENABLED: PROPERTYKEY = PROPERTYKEY {
    fmtid: LISTEN_SETTINGS_FMTID,
    pid: 1,
};

/// Endpoint ID of the playback device audio is routed to
/// (`VT_LPWSTR`, or `VT_EMPTY` for the default playback device).
pub const PKEY_LISTEN_OUTPUT: PROPERTYKEY = PROPERTYKEY {
    fmtid: LISTEN_SETTINGS_FMTID,
    pid: 0,
};

/// Read both listen properties from an open property store.
///
/// An endpoint that never had the checkbox set reports `VT_EMPTY`, which
/// reads as disabled.
pub(crate) fn read_settings(store: &IPropertyStore) -> Result<ListenSettings, ListenError> {
    unsafe {
        let checkbox = store
            .GetValue(&PKEY_LISTEN_ENABLED)
            .map_err(|e| ListenError::PropertyRead(format!("listen checkbox: {e}")))?;
        let enabled = bool::try_from(&checkbox).unwrap_or(false);

        let output = store
            .GetValue(&PKEY_LISTEN_OUTPUT)
            .map_err(|e| ListenError::PropertyRead(format!("listen output: {e}")))?;
        let output = output.to_string();

        Ok(ListenSettings {
            enabled,
            output_device_id: if output.is_empty() { None } else { Some(output) },
        })
    }
}

/// Write both listen properties and commit the store.
pub(crate) fn write_settings(
    store: &IPropertyStore,
    enable: bool,
    output_device_id: Option<&str>,
) -> Result<(), ListenError> {
    unsafe {
        let checkbox = PROPVARIANT::from(enable);
        store
            .SetValue(&PKEY_LISTEN_ENABLED, &checkbox)
            .map_err(|e| ListenError::PropertyWrite(format!("listen checkbox: {e}")))?;

        let output = match output_device_id {
            Some(id) => PROPVARIANT::from(id),
            None => PROPVARIANT::default(),
        };
        store
            .SetValue(&PKEY_LISTEN_OUTPUT, &output)
            .map_err(|e| ListenError::PropertyWrite(format!("listen output: {e}")))?;

        // SetValue alone does not reliably reach the audio engine.
        store
            .Commit()
            .map_err(|e| ListenError::PropertyWrite(format!("commit: {e}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_keys_match_the_listen_settings_set() {
        assert_eq!(PKEY_LISTEN_ENABLED.fmtid, LISTEN_SETTINGS_FMTID);
        assert_eq!(PKEY_LISTEN_OUTPUT.fmtid, LISTEN_SETTINGS_FMTID);
        assert_eq!(PKEY_LISTEN_ENABLED.pid, 1);
        assert_eq!(PKEY_LISTEN_OUTPUT.pid, 0);
    }

    #[test]
    fn fmtid_has_the_documented_byte_layout() {
        let guid = LISTEN_SETTINGS_FMTID;
        assert_eq!(guid.data1, 0x24db_b0fc);
        assert_eq!(guid.data2, 0x9311);
        assert_eq!(guid.data3, 0x4b3d);
        assert_eq!(guid.data4, [0x9c, 0xf0, 0x18, 0xff, 0x15, 0x56, 0x39, 0xd4]);
    }
}
