//! Interactive capture session.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;

use lookout_types::DeviceDescriptor;

use crate::presenter::{ConsolePresenter, Presenter};
use crate::session;

fn print_devices(devices: &[DeviceDescriptor]) {
    if devices.is_empty() {
        println!("No video input devices found.");
        return;
    }
    for device in devices {
        println!("  {}  {}", device.id, device.label);
    }
}

/// Run the interactive session: Enter captures and describes the current
/// frame; commands change the selected camera or the prompt.
pub async fn run_watch(
    device: Option<String>,
    api_key: Option<String>,
    no_speak: bool,
) -> Result<()> {
    let config = lookout_config::load_config().unwrap_or_default();
    let presenter: Arc<dyn Presenter> = Arc::new(ConsolePresenter);
    let controller = session::build_controller(&config, api_key, no_speak, presenter.clone());

    // Enumeration failure is presented, not fatal; the session still runs.
    let devices = match lookout_camera::list_devices() {
        Ok(devices) => devices,
        Err(e) => {
            tracing::error!("Error enumerating devices: {e}");
            presenter.show(&format!("Error enumerating devices: {e}"));
            Vec::new()
        }
    };
    println!("Available cameras:");
    print_devices(&devices);

    // Initial device: flag > config > first enumerated.
    let initial = device
        .or_else(|| config.camera.device.clone())
        .or_else(|| devices.first().map(|d| d.id.clone()));
    if let Some(id) = initial {
        controller.select_device(&id);
    }

    println!();
    println!("lookout watch (model: {})", config.vision.model);
    println!("Press Enter to capture and describe the current frame.");
    println!("Commands: camera <id>, prompt <text>, prompt, devices, quit\n");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        let bytes = stdin.lock().read_line(&mut line)?;
        if bytes == 0 {
            // EOF (Ctrl+D)
            println!();
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            controller.trigger().await;
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }
        if input == "devices" {
            match lookout_camera::list_devices() {
                Ok(devices) => print_devices(&devices),
                Err(e) => presenter.show(&format!("Error enumerating devices: {e}")),
            }
            continue;
        }
        if let Some(id) = input.strip_prefix("camera ") {
            if controller.select_device(id.trim()) {
                println!("Switched to camera {}", id.trim());
            }
            continue;
        }
        if let Some(prompt) = input.strip_prefix("prompt ") {
            controller.set_prompt(prompt.trim());
            println!("Prompt updated.");
            continue;
        }
        if input == "prompt" {
            println!("{}", controller.prompt());
            continue;
        }
        println!("Unknown command. Press Enter to capture, or use: camera <id>, prompt <text>, devices, quit");
    }

    Ok(())
}
