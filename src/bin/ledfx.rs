use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use log::{debug, error};

use ledfx_rs::{config, LedFx, PresetCategory, RestClient};

#[derive(Parser, Debug)]
#[command(name = "ledfx", version, about = "Control a LedFx instance")]
struct Args {
    /// YAML (or .json) config file with the server address.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8888)]
    port: u16,

    #[arg(long)]
    https: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbosity: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show instance information.
    Info,
    /// List effect ids.
    Effects,
    /// List virtual ids.
    Virtuals,
    /// List device ids.
    Devices,
    /// List the presets of an effect, defaults first.
    Presets { effect: String },
    /// Activate a preset on a virtual.
    SetPreset {
        virtual_id: String,
        effect: String,
        preset: String,
    },
}

fn server_config(args: &Args) -> std::io::Result<config::Server> {
    match &args.config {
        Some(path) => {
            let is_json = path.extension().map_or(false, |ext| ext == "json");
            let root = if is_json {
                config::read_config_json(path)?
            } else {
                config::read_config_yaml(path)?
            };
            Ok(root.server)
        }
        None => Ok(config::Server {
            host: args.host.clone(),
            port: args.port,
            https: args.https,
            ..config::Server::default()
        }),
    }
}

fn print_list(items: &[String]) {
    for (i, item) in items.iter().enumerate() {
        println!("{} {}", i, item);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let server = server_config(args)?;
    let ledfx = LedFx::new(RestClient::from_config(&server)?);
    debug!("Using {}", ledfx.api.transport().base_url());

    match &args.command {
        Command::Info => {
            let info = ledfx.api.info()?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Effects => print_list(&ledfx.presets.effect_ids()?),
        Command::Virtuals => print_list(&ledfx.api.virtual_ids()?),
        Command::Devices => print_list(&ledfx.api.device_ids()?),
        Command::Presets { effect } => {
            let mut i = 0;
            for &category in PresetCategory::ALL.iter() {
                for preset in ledfx.presets.presets_for_effect(effect, category)? {
                    println!("{} {} ({})", i, preset, category);
                    i += 1;
                }
            }
        }
        Command::SetPreset {
            virtual_id,
            effect,
            preset,
        } => {
            ledfx.presets.load()?;
            let response = ledfx.presets.set_preset(virtual_id, effect, preset)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let default_level = match args.verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();

    if let Err(err) = run(&args) {
        error!("{}", err);
        process::exit(1);
    }
}
