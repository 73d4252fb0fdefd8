// Keyswap CLI
// Evdev key remapper: listing, monitoring, and the remap run loop

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use keyswap_core::evdev;
use keyswap_core::{
    canonical_name, count_matches, enumerate_devices, event_type_name, find_device, CancelToken,
    Config, DebugLog, DeviceConfig, DeviceSession, EvdevSource, EventSource, SourcePoll,
    DEFAULT_CONFIG_PATH,
};

/// Linux evdev key remapper
#[derive(Parser, Debug)]
#[command(name = "keyswap")]
#[command(version)]
#[command(about = "Remap keys and buttons on Linux input devices", long_about = None)]
struct Args {
    /// List input devices available for remapping
    #[arg(short, long)]
    list: bool,

    /// Print decoded events from a device without remapping; with no
    /// identifier the first configured device is monitored
    #[arg(short = 'L', long, value_name = "IDENTIFIER")]
    listen: Option<Option<String>>,

    /// Configuration file to run with
    #[arg(short, long, value_name = "FILE")]
    run: Option<PathBuf>,

    /// Configuration file (positional form)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,
}

impl Args {
    fn config_path(&self) -> PathBuf {
        self.run
            .clone()
            .or_else(|| self.config.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list {
        return list_devices();
    }

    // Opening and grabbing /dev/input nodes normally needs root.
    if unsafe { libc::geteuid() } != 0 {
        warn!("not running as root; device access will likely be denied");
    }

    let cancel = CancelToken::new();
    spawn_signal_thread(cancel.clone())?;

    match args.listen.clone() {
        Some(identifier) => listen(identifier, &args.config_path(), &cancel),
        None => run(&args.config_path(), &cancel),
    }
}

/// Flip the cancellation token on SIGINT/SIGTERM from a dedicated thread.
fn spawn_signal_thread(cancel: CancelToken) -> Result<()> {
    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("failed to install signal handlers")?;

    std::thread::spawn(move || {
        for signal in &mut signals {
            match signal {
                SIGINT | SIGTERM => {
                    println!("\nReceived signal, shutting down...");
                    cancel.cancel();
                    break;
                }
                _ => {}
            }
        }
    });
    Ok(())
}

/// Grouped device listing: one header line per device name, one indented
/// line per event node with its identifier in brackets.
fn list_devices() -> Result<()> {
    let listings = enumerate_devices();
    if listings.is_empty() {
        println!("No input devices available.");
        return Ok(());
    }

    let mut current_name: Option<&str> = None;
    let mut groups = 0usize;
    for listing in &listings {
        if current_name != Some(listing.name.as_str()) {
            println!("{}", listing.name);
            current_name = Some(&listing.name);
            groups += 1;
        }
        match &listing.identifier {
            Some(id) => println!("  {} [{}]", listing.path.display(), id),
            None => println!("  {} [no identifier available]", listing.path.display()),
        }
    }

    println!();
    println!("{groups} device(s) found");
    Ok(())
}

/// Monitor mode: print decoded events from one device, no grab, no remap.
fn listen(identifier: Option<String>, config_path: &Path, cancel: &CancelToken) -> Result<()> {
    let (identifier, name_match) = match identifier.filter(|s| !s.is_empty()) {
        Some(id) => (Some(id), None),
        None => {
            let config = Config::load(config_path)
                .with_context(|| format!("failed to load {}", config_path.display()))?;
            let first = config
                .devices
                .into_iter()
                .next()
                .context("no devices configured to listen on")?;
            (first.identifier, first.name_match)
        }
    };

    let path = find_device(
        identifier.as_deref().unwrap_or(""),
        name_match.as_deref().unwrap_or(""),
    )?;
    let device = evdev::raw_stream::RawDevice::open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut source = EvdevSource::new(device);

    println!(
        "Listening on '{}' ({}). Press Ctrl+C to stop.",
        source.name(),
        path.display()
    );

    while !cancel.is_cancelled() {
        match source.poll()? {
            SourcePoll::Event(ev) => {
                let type_name = event_type_name(ev.event_type());
                match canonical_name(ev.event_type(), ev.code()) {
                    Some(name) => println!(
                        "type={type_name}({}) code={name}({}) value={}",
                        ev.event_type().0,
                        ev.code(),
                        ev.value()
                    ),
                    None => println!(
                        "type={type_name}({}) code={} value={}",
                        ev.event_type().0,
                        ev.code(),
                        ev.value()
                    ),
                }
            }
            SourcePoll::Dropped => println!("(buffer overrun, events lost)"),
            SourcePoll::Empty => {}
        }
    }
    Ok(())
}

fn device_label(device: &DeviceConfig) -> &str {
    device
        .uuid
        .as_deref()
        .or(device.identifier.as_deref())
        .or(device.name_match.as_deref())
        .unwrap_or("<device>")
}

/// Run mode: set up every configured device, then service the first
/// session that came up.
fn run(config_path: &Path, cancel: &CancelToken) -> Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    if config.devices.is_empty() {
        bail!("no devices configured in {}", config_path.display());
    }

    let mut debug_log = if config.debug {
        match DebugLog::create(&config.debug_log) {
            Ok(log) => {
                info!("debug capture enabled: {}", config.debug_log);
                Some(log)
            }
            Err(e) => {
                warn!("cannot open debug log {}: {e}", config.debug_log);
                None
            }
        }
    } else {
        None
    };

    let mut sessions = Vec::new();
    for device in &config.devices {
        let label = device_label(device);

        let identifier = device.identifier.as_deref().unwrap_or("");
        let name_match = device.name_match.as_deref().unwrap_or("");

        match count_matches(identifier, name_match) {
            Ok(n) if n > 1 => warn!("'{label}': {n} devices match, using the first"),
            _ => {}
        }

        let path = match find_device(identifier, name_match) {
            Ok(path) => path,
            Err(e) => {
                warn!("'{label}': {e}");
                continue;
            }
        };

        match DeviceSession::open(&path, device) {
            Ok(session) => {
                info!("'{}': remapping via {}", session.name(), path.display());
                sessions.push(session);
            }
            Err(e) => warn!("'{label}': setup failed: {e}"),
        }
    }

    if sessions.is_empty() {
        bail!("no configured device could be set up");
    }
    if sessions.len() > 1 {
        warn!("{} sessions set up, servicing the first only", sessions.len());
    }

    println!("keyswap is running. Press Ctrl+C to exit.");
    sessions[0].run(debug_log.as_mut(), cancel)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_config_path() {
        let args = Args::parse_from(["keyswap"]);

        assert!(!args.list);
        assert!(args.listen.is_none());
        assert_eq!(args.config_path(), PathBuf::from("index.json"));
    }

    #[test]
    fn test_args_positional_config() {
        let args = Args::parse_from(["keyswap", "/etc/keyswap/index.json"]);

        assert_eq!(args.config_path(), PathBuf::from("/etc/keyswap/index.json"));
    }

    #[test]
    fn test_args_run_flag_wins_over_positional() {
        let args = Args::parse_from(["keyswap", "--run", "/tmp/a.json", "/tmp/b.json"]);

        assert_eq!(args.config_path(), PathBuf::from("/tmp/a.json"));
    }

    #[test]
    fn test_args_list() {
        let args = Args::parse_from(["keyswap", "--list"]);

        assert!(args.list);
    }

    #[test]
    fn test_args_listen_with_identifier() {
        let args = Args::parse_from(["keyswap", "--listen", "046d:c08b"]);

        assert_eq!(args.listen, Some(Some("046d:c08b".to_string())));
    }

    #[test]
    fn test_args_listen_without_identifier() {
        let args = Args::parse_from(["keyswap", "--listen"]);

        assert_eq!(args.listen, Some(None));
    }
}
