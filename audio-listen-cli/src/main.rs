//! Command-line control of the Windows "Listen to this device" setting.
//!
//! Lists capture/playback endpoints and toggles listening on a capture
//! endpoint identified by its friendly name, e.g.:
//!
//! ```text
//! audio-listen enable "Microphone (HD Webcam C525)"
//! audio-listen toggle "Microphone (HD Webcam C525)"
//! ```

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "audio-listen")]
#[command(version)]
#[command(about = "Toggle the Windows 'Listen to this device' setting", long_about = None)]
struct Cli {
    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List active capture endpoints
    #[command(alias = "ls")]
    Inputs,

    /// List active playback endpoints (listen targets)
    Outputs,

    /// Show the listen settings of a capture endpoint
    Status {
        /// Friendly name, exactly as shown in the Sound control panel
        device_name: String,
    },

    /// Route a capture endpoint to a playback device
    Enable {
        device_name: String,

        /// Endpoint ID of the playback device (see `outputs`);
        /// defaults to the default playback device
        #[arg(long)]
        output: Option<String>,
    },

    /// Stop listening to a capture endpoint
    Disable { device_name: String },

    /// Flip the current listen state
    Toggle { device_name: String },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    std::process::exit(run(cli));
}

#[cfg(target_os = "windows")]
fn run(cli: Cli) -> i32 {
    use audio_listen_core::AudioEndpoint;
    use audio_listen_windows::MmDeviceBackend;

    fn print_endpoints(endpoints: &[AudioEndpoint], json: bool) -> i32 {
        if json {
            return match serde_json::to_string_pretty(endpoints) {
                Ok(text) => {
                    println!("{text}");
                    0
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    1
                }
            };
        }
        for endpoint in endpoints {
            let marker = if endpoint.is_default { " (default)" } else { "" };
            println!("{}{}", endpoint.name, marker);
            println!("  id: {}", endpoint.id);
        }
        0
    }

    // report accumulated failures the way the original test program did
    fn finish(controller: &audio_listen_core::InputListenController<MmDeviceBackend>) -> i32 {
        if controller.has_error() {
            eprint!("{}", controller.errors());
            1
        } else {
            0
        }
    }

    let mut controller = audio_listen_windows::new_controller();

    match cli.command {
        Commands::Inputs => {
            let inputs = controller.list_inputs();
            let code = print_endpoints(&inputs, cli.json);
            if code != 0 {
                return code;
            }
            finish(&controller)
        }
        Commands::Outputs => match MmDeviceBackend::new().and_then(|b| b.list_outputs()) {
            Ok(outputs) => print_endpoints(&outputs, cli.json),
            Err(e) => {
                eprintln!("error: {e}");
                1
            }
        },
        Commands::Status { device_name } => {
            let Some(settings) = controller.listen_settings(&device_name) else {
                return finish(&controller);
            };
            if cli.json {
                match serde_json::to_string_pretty(&settings) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        eprintln!("error: {e}");
                        return 1;
                    }
                }
            } else {
                println!("listening: {}", settings.enabled);
                println!(
                    "output: {}",
                    settings
                        .output_device_id
                        .as_deref()
                        .unwrap_or("default playback device")
                );
            }
            0
        }
        Commands::Enable {
            device_name,
            output,
        } => {
            if controller.set_listen_with_output(&device_name, true, output.as_deref()) {
                println!("listening to '{device_name}' enabled");
            }
            finish(&controller)
        }
        Commands::Disable { device_name } => {
            if controller.set_listen(&device_name, false) {
                println!("listening to '{device_name}' disabled");
            }
            finish(&controller)
        }
        Commands::Toggle { device_name } => {
            let enabled = controller.is_listening(&device_name);
            if controller.has_error() {
                return finish(&controller);
            }
            if controller.set_listen(&device_name, !enabled) {
                println!(
                    "listening to '{device_name}' {}",
                    if enabled { "disabled" } else { "enabled" }
                );
            }
            finish(&controller)
        }
    }
}

#[cfg(not(target_os = "windows"))]
fn run(_cli: Cli) -> i32 {
    eprintln!("audio-listen only works on Windows: the listen-to-device setting is an MMDevice endpoint property");
    1
}

#[cfg(test)]
mod tests {
    use audio_listen_core::{AudioEndpoint, ListenSettings};

    // the --json paths render these two types; they must serialize cleanly
    #[test]
    fn json_output_types_serialize() {
        let endpoints = [AudioEndpoint {
            id: "{0.0.1.00000000}.{a1b2c3d4-0000-0000-0000-000000000001}".to_owned(),
            name: "Microphone (USB Audio)".to_owned(),
            is_default: true,
        }];
        let text = serde_json::to_string_pretty(&endpoints[..]).unwrap();
        assert!(text.contains("\"name\": \"Microphone (USB Audio)\""));
        assert!(text.contains("\"is_default\": true"));

        let settings = ListenSettings {
            enabled: true,
            output_device_id: None,
        };
        let text = serde_json::to_string_pretty(&settings).unwrap();
        assert!(text.contains("\"enabled\": true"));
        assert!(text.contains("\"output_device_id\": null"));
    }
}
