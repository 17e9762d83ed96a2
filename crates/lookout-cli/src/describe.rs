//! One-shot capture-and-describe command.

use std::sync::Arc;

use anyhow::Result;

use lookout_types::{RequestState, TriggerOutcome};

use crate::presenter::{ConsolePresenter, Presenter};
use crate::session;

/// Capture one frame from the selected device, describe it, and speak the
/// result.
pub async fn run_describe(
    device: Option<String>,
    prompt: Option<String>,
    api_key: Option<String>,
    no_speak: bool,
) -> Result<()> {
    let config = lookout_config::load_config().unwrap_or_default();
    let presenter: Arc<dyn Presenter> = Arc::new(ConsolePresenter);
    let controller = session::build_controller(&config, api_key, no_speak, presenter);

    if let Some(prompt) = prompt {
        controller.set_prompt(&prompt);
    }

    // Device: flag > config > first enumerated.
    let device_id = match device.or_else(|| config.camera.device.clone()) {
        Some(id) => id,
        None => {
            let devices = lookout_camera::list_devices()?;
            match devices.first() {
                Some(d) => d.id.clone(),
                None => anyhow::bail!("No video input devices found"),
            }
        }
    };

    if !controller.select_device(&device_id) {
        anyhow::bail!("Could not open camera {device_id}");
    }

    match controller.trigger().await {
        TriggerOutcome::Completed(RequestState::Succeeded) => Ok(()),
        TriggerOutcome::MissingCredential => anyhow::bail!(
            "No API key provided (use --api-key, the config file, or GEMINI_API_KEY)"
        ),
        _ => anyhow::bail!("Describe request failed"),
    }
}
