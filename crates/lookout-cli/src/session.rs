//! Capture-and-describe session controller.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use lookout_camera::{CameraBinder, FrameSource};
use lookout_config::LookoutConfig;
use lookout_media::speech::{CommandSynthesizer, NullSynthesizer};
use lookout_media::types::{ImageRequest, SpeechSynthesizer, VisionProvider};
use lookout_media::vision::GeminiVisionProvider;
use lookout_types::{RequestState, TriggerOutcome};

use crate::presenter::Presenter;

const LOADING_MESSAGE: &str = "Loading... (this can take up to 30s)";
const MISSING_KEY_MESSAGE: &str = "Please provide an API key.";

/// Builds a vision client from a credential, once per request.
pub type VisionFactory =
    Box<dyn Fn(&str) -> anyhow::Result<Arc<dyn VisionProvider>> + Send + Sync>;

/// Owns the request state and the injected collaborators of the
/// capture-and-describe pipeline.
///
/// At most one request is in flight at any time: the guard check and the
/// `InFlight` transition both happen under the state lock, before the
/// pipeline's first await point, so a concurrent trigger always observes
/// `InFlight` and becomes a no-op.
pub struct SessionController {
    state: Mutex<RequestState>,
    camera: Mutex<Box<dyn FrameSource>>,
    build_vision: VisionFactory,
    speech: Arc<dyn SpeechSynthesizer>,
    presenter: Arc<dyn Presenter>,
    prompt: Mutex<String>,
    credential: Mutex<String>,
}

impl SessionController {
    pub fn new(
        camera: Box<dyn FrameSource>,
        build_vision: VisionFactory,
        speech: Arc<dyn SpeechSynthesizer>,
        presenter: Arc<dyn Presenter>,
        prompt: String,
        credential: String,
    ) -> Self {
        Self {
            state: Mutex::new(RequestState::Idle),
            camera: Mutex::new(camera),
            build_vision,
            speech,
            presenter,
            prompt: Mutex::new(prompt),
            credential: Mutex::new(credential),
        }
    }

    pub fn state(&self) -> RequestState {
        *self.state.lock()
    }

    pub fn prompt(&self) -> String {
        self.prompt.lock().clone()
    }

    pub fn set_prompt(&self, prompt: &str) {
        *self.prompt.lock() = prompt.to_string();
    }

    pub fn set_credential(&self, credential: &str) {
        *self.credential.lock() = credential.to_string();
    }

    pub fn bound_device(&self) -> Option<String> {
        self.camera.lock().bound_device().map(String::from)
    }

    /// Bind the camera to a newly selected device.
    ///
    /// On failure the error is presented and the previous binding, if any,
    /// stays in place. Returns whether the bind succeeded.
    pub fn select_device(&self, device_id: &str) -> bool {
        let mut camera = self.camera.lock();
        match camera.bind(device_id) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error accessing camera {device_id}: {e}");
                self.presenter.show(&format!("Error accessing camera: {e}"));
                false
            }
        }
    }

    /// Run the capture-and-describe pipeline once.
    ///
    /// Order: guard, snapshot, credential check, client construction,
    /// in-flight transition, remote call, present + speak, unwind. The
    /// credential and construction checks run before `InFlight` is entered,
    /// so a rejected attempt never blocks the next one.
    pub async fn trigger(&self) -> TriggerOutcome {
        let (provider, frame, prompt) = {
            let mut state = self.state.lock();
            if state.is_in_flight() {
                return TriggerOutcome::Busy;
            }

            let frame = match self.camera.lock().snapshot() {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!("Snapshot failed: {e}");
                    self.presenter.show(&format!("Error capturing frame: {e}"));
                    *state = RequestState::Failed;
                    return TriggerOutcome::Completed(RequestState::Failed);
                }
            };

            let credential = self.credential.lock().trim().to_string();
            if credential.is_empty() {
                self.presenter.show(MISSING_KEY_MESSAGE);
                return TriggerOutcome::MissingCredential;
            }

            let provider = match (self.build_vision)(&credential) {
                Ok(provider) => provider,
                Err(e) => {
                    tracing::error!("Vision client construction failed: {e}");
                    self.presenter
                        .show(&format!("Something went wrong.\nError: {e}"));
                    *state = RequestState::Failed;
                    return TriggerOutcome::Completed(RequestState::Failed);
                }
            };

            *state = RequestState::InFlight;
            self.presenter.show(LOADING_MESSAGE);
            (provider, frame, self.prompt.lock().clone())
        };

        let result = provider
            .describe_image(ImageRequest {
                data: frame.data,
                mime_type: frame.mime_type,
                prompt,
            })
            .await;

        let final_state = match result {
            Ok(res) => {
                self.presenter.show(&res.description);
                if let Err(e) = self.speech.speak(&res.description).await {
                    tracing::warn!("Speech playback failed: {e}");
                }
                RequestState::Succeeded
            }
            Err(e) => {
                tracing::error!("Describe request failed: {e}");
                self.presenter
                    .show(&format!("Something went wrong.\nError: {e}"));
                RequestState::Failed
            }
        };

        // Single transition point: InFlight is always left, whatever happened.
        *self.state.lock() = final_state;
        TriggerOutcome::Completed(final_state)
    }
}

/// Assemble a controller wired to the real camera, Gemini, and speech stack.
pub fn build_controller(
    config: &LookoutConfig,
    api_key_flag: Option<String>,
    no_speak: bool,
    presenter: Arc<dyn Presenter>,
) -> SessionController {
    let camera = CameraBinder::new(
        config.camera.width,
        config.camera.height,
        config.camera.jpeg_quality,
    );

    let model = config.vision.model.clone();
    let timeout = Duration::from_secs(config.vision.timeout_secs);
    let build_vision: VisionFactory = Box::new(move |credential: &str| {
        let provider = GeminiVisionProvider::new(credential.to_string(), model.clone(), timeout)?;
        Ok(Arc::new(provider) as Arc<dyn VisionProvider>)
    });

    let speech: Arc<dyn SpeechSynthesizer> = if no_speak || !config.speech.enabled {
        Arc::new(NullSynthesizer)
    } else {
        match CommandSynthesizer::new(config.speech.engine.clone(), config.speech.voice.clone()) {
            Ok(synth) => Arc::new(synth),
            Err(e) => {
                tracing::warn!("Speech disabled: {e}");
                Arc::new(NullSynthesizer)
            }
        }
    };

    let credential = lookout_config::resolve_api_key(api_key_flag, config);

    SessionController::new(
        Box::new(camera),
        build_vision,
        speech,
        presenter,
        config.prompt.clone(),
        credential,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use lookout_camera::CameraError;
    use lookout_media::types::ImageResult;
    use lookout_types::CaptureFrame;

    struct MockPresenter {
        shown: Mutex<Vec<String>>,
    }

    impl MockPresenter {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                shown: Mutex::new(Vec::new()),
            })
        }

        fn last(&self) -> String {
            self.shown.lock().last().cloned().unwrap_or_default()
        }
    }

    impl Presenter for MockPresenter {
        fn show(&self, text: &str) {
            self.shown.lock().push(text.to_string());
        }
    }

    #[derive(Default)]
    struct SourceLog {
        binds: Vec<String>,
        snapshots: usize,
    }

    struct MockSource {
        log: Arc<Mutex<SourceLog>>,
        fail_bind_for: Option<String>,
        bound: Option<String>,
    }

    impl FrameSource for MockSource {
        fn bind(&mut self, device_id: &str) -> Result<(), CameraError> {
            self.log.lock().binds.push(device_id.to_string());
            if self.fail_bind_for.as_deref() == Some(device_id) {
                return Err(CameraError::NotBound);
            }
            self.bound = Some(device_id.to_string());
            Ok(())
        }

        fn bound_device(&self) -> Option<&str> {
            self.bound.as_deref()
        }

        fn snapshot(&mut self) -> Result<CaptureFrame, CameraError> {
            self.log.lock().snapshots += 1;
            Ok(CaptureFrame {
                data: vec![0xFF, 0xD8, 0xFF],
                mime_type: "image/jpeg".into(),
                width: 4,
                height: 4,
            })
        }
    }

    struct MockVision {
        calls: Mutex<Vec<ImageRequest>>,
        response: Result<String, String>,
    }

    impl MockVision {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                response: Ok(text.to_string()),
            })
        }

        fn err(msg: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                response: Err(msg.to_string()),
            })
        }
    }

    #[async_trait::async_trait]
    impl VisionProvider for MockVision {
        fn id(&self) -> &str {
            "mock-vision"
        }

        async fn describe_image(&self, req: ImageRequest) -> anyhow::Result<ImageResult> {
            self.calls.lock().push(req);
            // Suspend once so a concurrent trigger can run its guard check
            // while this request is in flight.
            tokio::task::yield_now().await;
            match &self.response {
                Ok(text) => Ok(ImageResult {
                    description: text.clone(),
                }),
                Err(msg) => Err(anyhow::anyhow!("{msg}")),
            }
        }
    }

    struct MockSpeech {
        spoken: Mutex<Vec<String>>,
    }

    impl MockSpeech {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                spoken: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl SpeechSynthesizer for MockSpeech {
        fn id(&self) -> &str {
            "mock-speech"
        }

        async fn speak(&self, text: &str) -> anyhow::Result<()> {
            self.spoken.lock().push(text.to_string());
            Ok(())
        }
    }

    fn controller_with(
        provider: Arc<MockVision>,
        speech: Arc<MockSpeech>,
        presenter: Arc<MockPresenter>,
        log: Arc<Mutex<SourceLog>>,
        credential: &str,
    ) -> SessionController {
        let source = MockSource {
            log,
            fail_bind_for: None,
            bound: Some("0".into()),
        };
        SessionController::new(
            Box::new(source),
            Box::new(move |_key: &str| Ok(provider.clone() as Arc<dyn VisionProvider>)),
            speech,
            presenter,
            "Describe the scene.".into(),
            credential.into(),
        )
    }

    #[tokio::test]
    async fn test_success_presents_and_speaks_exact_text() {
        let provider = MockVision::ok("A cat on a keyboard.");
        let speech = MockSpeech::new();
        let presenter = MockPresenter::new();
        let log = Arc::new(Mutex::new(SourceLog::default()));
        let controller = controller_with(
            provider.clone(),
            speech.clone(),
            presenter.clone(),
            log.clone(),
            "key-123",
        );

        let outcome = controller.trigger().await;

        assert_eq!(outcome, TriggerOutcome::Completed(RequestState::Succeeded));
        assert_eq!(controller.state(), RequestState::Succeeded);
        assert_eq!(presenter.last(), "A cat on a keyboard.");
        assert!(presenter
            .shown
            .lock()
            .iter()
            .any(|m| m.starts_with("Loading")));
        assert_eq!(*speech.spoken.lock(), vec!["A cat on a keyboard."]);

        let calls = provider.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "Describe the scene.");
        assert_eq!(calls[0].mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_failure_presents_error_and_unwinds() {
        let provider = MockVision::err("quota exceeded");
        let speech = MockSpeech::new();
        let presenter = MockPresenter::new();
        let log = Arc::new(Mutex::new(SourceLog::default()));
        let controller =
            controller_with(provider, speech.clone(), presenter.clone(), log, "key-123");

        let outcome = controller.trigger().await;

        assert_eq!(outcome, TriggerOutcome::Completed(RequestState::Failed));
        assert_eq!(controller.state(), RequestState::Failed);
        assert!(presenter.last().contains("Error"));
        assert!(presenter.last().contains("quota exceeded"));
        assert!(speech.spoken.lock().is_empty());
    }

    #[tokio::test]
    async fn test_empty_credential_makes_no_call() {
        let provider = MockVision::ok("unused");
        let speech = MockSpeech::new();
        let presenter = MockPresenter::new();
        let log = Arc::new(Mutex::new(SourceLog::default()));
        let controller = controller_with(
            provider.clone(),
            speech,
            presenter.clone(),
            log,
            "   ",
        );

        let outcome = controller.trigger().await;

        assert_eq!(outcome, TriggerOutcome::MissingCredential);
        assert_eq!(controller.state(), RequestState::Idle);
        assert!(provider.calls.lock().is_empty());
        assert_eq!(presenter.last(), "Please provide an API key.");

        // A later attempt with a credential is not blocked.
        controller.set_credential("key-123");
        let outcome = controller.trigger().await;
        assert_eq!(outcome, TriggerOutcome::Completed(RequestState::Succeeded));
    }

    #[tokio::test]
    async fn test_client_construction_failure_makes_no_call() {
        let speech = MockSpeech::new();
        let presenter = MockPresenter::new();
        let log = Arc::new(Mutex::new(SourceLog::default()));
        let source = MockSource {
            log,
            fail_bind_for: None,
            bound: Some("0".into()),
        };
        let controller = SessionController::new(
            Box::new(source),
            Box::new(|_key: &str| Err(anyhow::anyhow!("bad credential format"))),
            speech,
            presenter.clone(),
            "Describe.".into(),
            "key-123".into(),
        );

        let outcome = controller.trigger().await;

        assert_eq!(outcome, TriggerOutcome::Completed(RequestState::Failed));
        assert_eq!(controller.state(), RequestState::Failed);
        assert!(presenter.last().contains("bad credential format"));

        // The failed construction never entered InFlight, so the next
        // trigger runs.
        assert_ne!(controller.state(), RequestState::InFlight);
    }

    #[tokio::test]
    async fn test_concurrent_trigger_is_noop_while_in_flight() {
        let provider = MockVision::ok("slow answer");
        let speech = MockSpeech::new();
        let presenter = MockPresenter::new();
        let log = Arc::new(Mutex::new(SourceLog::default()));
        let controller = controller_with(
            provider.clone(),
            speech,
            presenter,
            log.clone(),
            "key-123",
        );

        // The first trigger enters InFlight before its first await point,
        // so the second, polled while the first is suspended, must lose
        // the guard check.
        let (first, second) = tokio::join!(controller.trigger(), controller.trigger());

        assert_eq!(first, TriggerOutcome::Completed(RequestState::Succeeded));
        assert_eq!(second, TriggerOutcome::Busy);
        // The losing trigger produced no side effects: one snapshot, one call.
        assert_eq!(log.lock().snapshots, 1);
        assert_eq!(provider.calls.lock().len(), 1);
        assert_eq!(controller.state(), RequestState::Succeeded);
    }

    #[tokio::test]
    async fn test_select_device_binds_exactly_once() {
        let provider = MockVision::ok("unused");
        let speech = MockSpeech::new();
        let presenter = MockPresenter::new();
        let log = Arc::new(Mutex::new(SourceLog::default()));
        let controller = controller_with(provider, speech, presenter, log.clone(), "key-123");

        assert!(controller.select_device("1"));
        assert_eq!(log.lock().binds, vec!["1".to_string()]);
        assert_eq!(controller.bound_device().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_failed_bind_keeps_previous_device() {
        let speech = MockSpeech::new();
        let presenter = MockPresenter::new();
        let log = Arc::new(Mutex::new(SourceLog::default()));
        let source = MockSource {
            log: log.clone(),
            fail_bind_for: Some("9".into()),
            bound: Some("0".into()),
        };
        let provider = MockVision::ok("unused");
        let controller = SessionController::new(
            Box::new(source),
            Box::new(move |_key: &str| Ok(provider.clone() as Arc<dyn VisionProvider>)),
            speech,
            presenter.clone(),
            "Describe.".into(),
            "key-123".into(),
        );

        assert!(!controller.select_device("9"));
        assert_eq!(controller.bound_device().as_deref(), Some("0"));
        assert!(presenter.last().contains("Error accessing camera"));
    }
}
