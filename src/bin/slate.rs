use std::path::PathBuf;
use std::thread;

use clap::Parser;
use slate_shell::actor;
use slate_shell::actor::broadcast::Broadcaster;
use slate_shell::actor::overview::{self, Overview};
use slate_shell::actor::rotation::{self, Rotation};
use slate_shell::actor::settings::{self, SettingsStore};
use slate_shell::apps::entry::AppEntry;
use slate_shell::common::config::{self, Settings, ShellCommand};
use slate_shell::common::log;
use slate_shell::sys::sensor::LoopbackSensor;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "slate", about = "Headless core of a touch-oriented mobile shell")]
struct Cli {
    /// Settings file to use instead of ~/.slate.toml.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Check the settings file for issues without starting the shell.
    #[arg(long)]
    validate: bool,
}

fn main() -> anyhow::Result<()> {
    let opt: Cli = Parser::parse();
    log::init_logging();

    let file = opt.settings.unwrap_or_else(config::settings_file);
    if !file.exists() {
        Settings::default().save(&file)?;
        info!("wrote default settings to {:?}", file);
    }

    let mut settings = Settings::read(&file)?;
    let issues = settings.validate();
    for issue in &issues {
        warn!(%issue, "settings issue");
    }
    if opt.validate {
        if issues.is_empty() {
            println!("{} ok", file.display());
            return Ok(());
        }
        anyhow::bail!("{} issue(s) in {}", issues.len(), file.display());
    }
    let fixes = settings.auto_fix_values();
    if fixes > 0 {
        info!(fixes, "auto-fixed settings values");
    }

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(shell(file, settings));
    Ok(())
}

async fn shell(file: PathBuf, settings: Settings) {
    let (broadcaster, broadcast_tx) = Broadcaster::new();

    // Stand-in render adapter: serialize every event the shell publishes. A
    // real front-end subscribes the same way and patches its widgets.
    let (sink_tx, mut sink_rx) = actor::channel();
    let _subscription = broadcast_tx.subscribe(sink_tx);
    let adapter = async move {
        while let Some((_span, event)) = sink_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => info!(event = %json, "shell event"),
                Err(err) => warn!(%err, "failed to serialize shell event"),
            }
        }
    };

    let (overview, overview_tx) = Overview::new(broadcast_tx.clone(), &settings);
    let (settings_tx, settings_rx) = actor::channel();
    let (rotation_tx, rotation_rx) = actor::channel();
    let rotation = Rotation::new(
        LoopbackSensor::new(rotation_tx.clone()),
        settings.shell.orientation_lock,
        broadcast_tx.clone(),
        settings_tx.clone(),
        rotation_rx,
    );
    let store = SettingsStore::new(
        file.clone(),
        settings.clone(),
        settings_rx,
        rotation_tx.clone(),
        overview_tx.clone(),
    );
    settings::spawn_watcher(file, settings_tx.clone());

    overview_tx.send(overview::Event::AppsDiscovered(seed_apps()));
    rotation_tx.send(rotation::Event::AccelerometerPresent(true));

    spawn_console(settings, overview_tx.clone(), rotation_tx.clone());

    let actors = async {
        tokio::join!(broadcaster.run(), adapter, overview.run(), rotation.run(), store.run());
    };
    tokio::select! {
        _ = actors => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                warn!(%err, "ctrl-c handler failed");
            }
            info!("shutting down");
        }
    }
}

/// Stand-in for the application registry collaborator.
fn seed_apps() -> Vec<AppEntry> {
    let specs: &[(&str, &str, &str, bool)] = &[
        ("org.gnome.Calls", "Calls", "Make and receive phone calls", true),
        ("sm.puri.Chatty", "Chats", "SMS and XMPP messaging", true),
        ("org.gnome.Epiphany", "Web", "Browse the web", true),
        ("org.gnome.Settings", "Settings", "Configure the device", true),
        ("org.gnome.Nautilus", "Files", "Browse files and folders", false),
        ("org.gnome.Snapshot", "Camera", "Take pictures and videos", true),
        ("org.gnome.Clocks", "Clocks", "Alarms, timers and world clocks", true),
        ("org.gnome.Calculator", "Calculator", "Do the math", true),
        ("org.gnome.TextEditor", "Text Editor", "Edit text files", false),
        ("org.gimp.GIMP", "Image Editor", "Create and edit images", false),
    ];
    specs
        .iter()
        .map(|(id, name, description, adaptive)| {
            let mut entry = AppEntry::new(*id, *name);
            entry.description = Some(description.to_string());
            entry.adaptive = *adaptive;
            entry
        })
        .collect()
}

/// Console driver standing in for the compositor's input side: orientation
/// readings, lockscreen transitions, registry churn, search input and key
/// chords all arrive as lines on stdin.
fn spawn_console(
    settings: Settings,
    overview_tx: overview::Sender,
    rotation_tx: rotation::Sender,
) {
    thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            for line in std::io::stdin().lines() {
                let Ok(line) = line else { break };
                handle_line(line.trim(), &settings, &overview_tx, &rotation_tx);
            }
        })
        .expect("failed to spawn console thread");
}

fn handle_line(
    line: &str,
    settings: &Settings,
    overview_tx: &overview::Sender,
    rotation_tx: &rotation::Sender,
) {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return;
    };
    let rest = parts.clone().collect::<Vec<_>>().join(" ");

    match cmd {
        "normal" | "right-up" | "bottom-up" | "left-up" | "undefined" => {
            rotation_tx.send(rotation::Event::OrientationChanged(cmd.to_string()));
        }
        "lock" => rotation_tx.send(rotation::Event::LockscreenLocked(true)),
        "unlock" => rotation_tx.send(rotation::Event::LockscreenLocked(false)),
        "sensor" => match parts.next() {
            Some("on") => rotation_tx.send(rotation::Event::AccelerometerPresent(true)),
            Some("off") => rotation_tx.send(rotation::Event::AccelerometerPresent(false)),
            _ => warn!("usage: sensor on|off"),
        },
        "search" => overview_tx.send(overview::Event::SearchChanged(rest)),
        "clear" => overview_tx.send(overview::Event::SearchChanged(String::new())),
        "install" => {
            let Some(id) = parts.next() else {
                warn!("usage: install <id> [name]");
                return;
            };
            let name = {
                let name = parts.collect::<Vec<_>>().join(" ");
                if name.is_empty() { id.to_string() } else { name }
            };
            overview_tx.send(overview::Event::AppInstalled(AppEntry::new(id, name)));
        }
        "uninstall" => match parts.next() {
            Some(id) => overview_tx.send(overview::Event::AppUninstalled(id.to_string())),
            None => warn!("usage: uninstall <id>"),
        },
        "adaptive" => overview_tx.send(overview::Event::ToggleFilterAdaptive),
        "rotate-lock" => rotation_tx.send(rotation::Event::ToggleOrientationLocked),
        "key" => {
            let chord = rest;
            match settings.keys.get(&chord) {
                Some(command) => dispatch(*command, overview_tx, rotation_tx),
                None => warn!(%chord, "no binding for chord"),
            }
        }
        _ => warn!(line, "unknown command"),
    }
}

fn dispatch(
    command: ShellCommand,
    overview_tx: &overview::Sender,
    rotation_tx: &rotation::Sender,
) {
    match command {
        ShellCommand::ToggleOrientationLock => {
            rotation_tx.send(rotation::Event::ToggleOrientationLocked)
        }
        ShellCommand::ToggleFilterAdaptive => {
            overview_tx.send(overview::Event::ToggleFilterAdaptive)
        }
        ShellCommand::ClearSearch => {
            overview_tx.send(overview::Event::SearchChanged(String::new()))
        }
        ShellCommand::ResetCarousel => overview_tx.send(overview::Event::ResetCarousel),
    }
}
