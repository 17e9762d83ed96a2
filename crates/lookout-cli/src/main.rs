mod describe;
mod presenter;
mod session;
mod watch;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lookout", about = "Camera snapshot description CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available video input devices
    Devices,
    /// Capture one frame, describe it, and speak the result
    Describe {
        /// Device id to capture from (first enumerated device if omitted)
        #[arg(short, long)]
        device: Option<String>,

        /// Prompt sent with the snapshot (config default if omitted)
        #[arg(short, long)]
        prompt: Option<String>,

        /// API key (overrides config and GEMINI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Skip speech playback
        #[arg(long)]
        no_speak: bool,
    },
    /// Interactive session: Enter captures, commands switch camera/prompt
    Watch {
        /// Device id to bind at startup
        #[arg(short, long)]
        device: Option<String>,

        /// API key (overrides config and GEMINI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Skip speech playback
        #[arg(long)]
        no_speak: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Devices => {
            let devices = lookout_camera::list_devices()?;
            if devices.is_empty() {
                println!("No video input devices found.");
            }
            for device in devices {
                println!("{}  {}", device.id, device.label);
            }
        }
        Commands::Describe {
            device,
            prompt,
            api_key,
            no_speak,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(describe::run_describe(device, prompt, api_key, no_speak))?;
        }
        Commands::Watch {
            device,
            api_key,
            no_speak,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(watch::run_watch(device, api_key, no_speak))?;
        }
    }

    Ok(())
}
