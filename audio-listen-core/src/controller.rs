use std::collections::HashMap;

use crate::models::device::{AudioEndpoint, ListenSettings};
use crate::models::error::ListenError;
use crate::traits::listen_backend::{ListenBackend, ListenControl};

/// Name-keyed controller over the listen-to-device setting.
///
/// Resolves capture endpoints by friendly name through a [`ListenBackend`]
/// and caches each resolved handle for the controller's lifetime. The
/// public surface fails soft: operations return `false` (or empty data) on
/// failure and record a line in an append-only plain-text error log. The
/// log and the error flag reset only by constructing a new controller.
///
/// Single-threaded by design: backends hand out COM apartment handles.
pub struct InputListenController<B: ListenBackend> {
    // Cached handles must drop before the backend that produced them.
    inputs: HashMap<String, Box<dyn ListenControl>>,
    backend: Option<B>,
    has_error: bool,
    error_log: String,
}

impl<B: ListenBackend> InputListenController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            inputs: HashMap::new(),
            backend: Some(backend),
            has_error: false,
            error_log: String::new(),
        }
    }

    /// Controller for a backend that failed to initialize.
    ///
    /// Keeps the bool-returning surface usable: every operation fails soft,
    /// and the initialization failure is already in the error log.
    pub fn backend_failed(error: ListenError) -> Self {
        let mut controller = Self {
            inputs: HashMap::new(),
            backend: None,
            has_error: false,
            error_log: String::new(),
        };
        controller.record_error(format!("initialization failed: {error}"));
        controller
    }

    /// Whether listening is enabled for the named capture endpoint.
    ///
    /// Returns `false` (and records the failure) if the endpoint is unknown
    /// or the property cannot be read.
    pub fn is_listening(&mut self, device_name: &str) -> bool {
        let read = match self.get_or_resolve(device_name) {
            Some(input) => input.is_listening(),
            None => return false,
        };
        match read {
            Ok(enabled) => enabled,
            Err(e) => {
                self.record_error(format!("is_listening('{device_name}') failed: {e}"));
                false
            }
        }
    }

    /// Both listen properties of the named capture endpoint.
    pub fn listen_settings(&mut self, device_name: &str) -> Option<ListenSettings> {
        let read = match self.get_or_resolve(device_name) {
            Some(input) => input.listen_settings(),
            None => return None,
        };
        match read {
            Ok(settings) => Some(settings),
            Err(e) => {
                self.record_error(format!("listen_settings('{device_name}') failed: {e}"));
                None
            }
        }
    }

    /// Enable or disable listening through the default playback device.
    pub fn set_listen(&mut self, device_name: &str, listen: bool) -> bool {
        self.set_listen_with_output(device_name, listen, None)
    }

    /// Enable or disable listening through a specific playback endpoint.
    ///
    /// `output_device_id` is the MMDevice endpoint ID of a render device;
    /// `None` routes to the default playback device.
    pub fn set_listen_with_output(
        &mut self,
        device_name: &str,
        listen: bool,
        output_device_id: Option<&str>,
    ) -> bool {
        let written = match self.get_or_resolve(device_name) {
            Some(input) => input.set_listen(listen, output_device_id),
            None => return false,
        };
        match written {
            Ok(()) => true,
            Err(e) => {
                self.record_error(format!("set_listen('{device_name}', {listen}) failed: {e}"));
                false
            }
        }
    }

    /// Active capture endpoints. Empty (with the failure recorded) on error.
    pub fn list_inputs(&mut self) -> Vec<AudioEndpoint> {
        let listed = match self.backend.as_ref() {
            Some(backend) => backend.list_inputs(),
            None => {
                self.record_error(format!("list_inputs() failed: {}", ListenError::BackendUnavailable));
                return Vec::new();
            }
        };
        match listed {
            Ok(inputs) => inputs,
            Err(e) => {
                self.record_error(format!("list_inputs() failed: {e}"));
                Vec::new()
            }
        }
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// The accumulated plain-text error log, one line per failure.
    pub fn errors(&self) -> &str {
        &self.error_log
    }

    /// Look up the cached handle for `device_name`, resolving it on first
    /// use. A failed lookup is not cached and is retried next time.
    fn get_or_resolve(&mut self, device_name: &str) -> Option<&dyn ListenControl> {
        if !self.inputs.contains_key(device_name) {
            let resolved = match self.backend.as_ref() {
                Some(backend) => backend.resolve(device_name),
                None => {
                    self.record_error(format!(
                        "audio input '{device_name}' unavailable: {}",
                        ListenError::BackendUnavailable
                    ));
                    return None;
                }
            };
            match resolved {
                Ok(input) => {
                    log::debug!("resolved audio input '{device_name}' ({})", input.info().id);
                    self.inputs.insert(device_name.to_owned(), input);
                }
                Err(e) => {
                    self.record_error(format!("audio input '{device_name}' not resolved: {e}"));
                    return None;
                }
            }
        }
        self.inputs.get(device_name).map(|input| input.as_ref())
    }

    fn record_error(&mut self, message: String) {
        log::warn!("{message}");
        self.has_error = true;
        self.error_log.push_str("[InputListenController] ");
        self.error_log.push_str(&message);
        self.error_log.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct FakeEndpointState {
        enabled: Cell<bool>,
        output: RefCell<Option<String>>,
        fail_reads: Cell<bool>,
        fail_writes: Cell<bool>,
    }

    struct FakeControl {
        name: String,
        state: Rc<FakeEndpointState>,
    }

    impl ListenControl for FakeControl {
        fn info(&self) -> AudioEndpoint {
            AudioEndpoint {
                id: format!("{{endpoint}}.{}", self.name),
                name: self.name.clone(),
                is_default: false,
            }
        }

        fn is_listening(&self) -> Result<bool, ListenError> {
            if self.state.fail_reads.get() {
                return Err(ListenError::PropertyRead("property store unavailable".into()));
            }
            Ok(self.state.enabled.get())
        }

        fn listen_settings(&self) -> Result<ListenSettings, ListenError> {
            Ok(ListenSettings {
                enabled: self.is_listening()?,
                output_device_id: self.state.output.borrow().clone(),
            })
        }

        fn set_listen(&self, enable: bool, output_device_id: Option<&str>) -> Result<(), ListenError> {
            if self.state.fail_writes.get() {
                return Err(ListenError::PropertyWrite("access denied".into()));
            }
            self.state.enabled.set(enable);
            *self.state.output.borrow_mut() = output_device_id.map(str::to_owned);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeBackend {
        endpoints: HashMap<String, Rc<FakeEndpointState>>,
        resolve_calls: Rc<Cell<usize>>,
        fail_listing: bool,
    }

    impl ListenBackend for FakeBackend {
        fn resolve(&self, device_name: &str) -> Result<Box<dyn ListenControl>, ListenError> {
            self.resolve_calls.set(self.resolve_calls.get() + 1);
            match self.endpoints.get(device_name) {
                Some(state) => Ok(Box::new(FakeControl {
                    name: device_name.to_owned(),
                    state: Rc::clone(state),
                })),
                None => Err(ListenError::DeviceNotFound(device_name.to_owned())),
            }
        }

        fn list_inputs(&self) -> Result<Vec<AudioEndpoint>, ListenError> {
            if self.fail_listing {
                return Err(ListenError::Enumeration("endpoint collection unavailable".into()));
            }
            let mut inputs: Vec<AudioEndpoint> = self
                .endpoints
                .keys()
                .map(|name| AudioEndpoint {
                    id: format!("{{endpoint}}.{name}"),
                    name: name.clone(),
                    is_default: false,
                })
                .collect();
            inputs.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(inputs)
        }
    }

    const MIC: &str = "Microphone (USB Audio)";

    fn controller_with_mic() -> (
        InputListenController<FakeBackend>,
        Rc<FakeEndpointState>,
        Rc<Cell<usize>>,
    ) {
        let state = Rc::new(FakeEndpointState::default());
        let mut backend = FakeBackend::default();
        backend.endpoints.insert(MIC.to_owned(), Rc::clone(&state));
        let calls = Rc::clone(&backend.resolve_calls);
        (InputListenController::new(backend), state, calls)
    }

    #[test]
    fn set_and_query_listen_state() {
        let (mut controller, state, _) = controller_with_mic();

        assert!(!controller.is_listening(MIC));
        assert!(controller.set_listen(MIC, true));
        assert!(controller.is_listening(MIC));
        assert!(state.enabled.get());
        // set_listen always retargets the default playback device
        assert_eq!(*state.output.borrow(), None);
        assert!(!controller.has_error());
    }

    #[test]
    fn set_listen_with_specific_output() {
        let (mut controller, state, _) = controller_with_mic();

        assert!(controller.set_listen_with_output(MIC, true, Some("{render}.speakers")));
        assert_eq!(state.output.borrow().as_deref(), Some("{render}.speakers"));

        let settings = controller.listen_settings(MIC).unwrap();
        assert_eq!(
            settings,
            ListenSettings {
                enabled: true,
                output_device_id: Some("{render}.speakers".into()),
            }
        );
    }

    #[test]
    fn handle_resolved_once_per_name() {
        let (mut controller, _, calls) = controller_with_mic();

        controller.is_listening(MIC);
        controller.set_listen(MIC, true);
        controller.is_listening(MIC);

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn unknown_device_fails_soft_and_is_not_cached() {
        let (mut controller, _, calls) = controller_with_mic();

        assert!(!controller.is_listening("Line In (Rear Panel)"));
        assert!(controller.has_error());
        assert!(controller.errors().contains("Line In (Rear Panel)"));

        // a failed lookup is retried on the next call
        assert!(!controller.set_listen("Line In (Rear Panel)", true));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn read_failure_returns_false_and_logs() {
        let (mut controller, state, _) = controller_with_mic();
        state.enabled.set(true);
        state.fail_reads.set(true);

        assert!(!controller.is_listening(MIC));
        assert!(controller.has_error());
        assert!(controller.errors().contains("is_listening"));
        assert!(controller.listen_settings(MIC).is_none());
    }

    #[test]
    fn write_failure_returns_false_and_logs() {
        let (mut controller, state, _) = controller_with_mic();
        state.fail_writes.set(true);

        assert!(!controller.set_listen(MIC, true));
        assert!(!state.enabled.get());
        assert!(controller.has_error());
        assert!(controller.errors().contains("set_listen"));
    }

    #[test]
    fn errors_accumulate_until_reconstruction() {
        let (mut controller, state, _) = controller_with_mic();
        state.fail_reads.set(true);

        controller.is_listening(MIC);
        controller.is_listening(MIC);
        assert_eq!(controller.errors().lines().count(), 2);

        // reconstructing is the only reset
        let (controller, _, _) = controller_with_mic();
        assert!(!controller.has_error());
        assert!(controller.errors().is_empty());
    }

    #[test]
    fn failed_backend_init_fails_soft() {
        let mut controller: InputListenController<FakeBackend> =
            InputListenController::backend_failed(ListenError::ComInit(
                "CoCreateInstance failed".into(),
            ));

        assert!(controller.has_error());
        assert!(!controller.is_listening(MIC));
        assert!(!controller.set_listen(MIC, true));
        assert!(controller.list_inputs().is_empty());
        assert!(controller.errors().contains("initialization failed"));
    }

    #[test]
    fn list_inputs_reports_active_endpoints() {
        let (mut controller, _, _) = controller_with_mic();

        let inputs = controller.list_inputs();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].name, MIC);
        assert!(!controller.has_error());
    }

    #[test]
    fn list_inputs_failure_is_recorded() {
        let backend = FakeBackend {
            fail_listing: true,
            ..FakeBackend::default()
        };
        let mut controller = InputListenController::new(backend);

        assert!(controller.list_inputs().is_empty());
        assert!(controller.has_error());
    }
}
