use clap::{Parser, Subcommand};
use eventpvp_config::{
    Backend, Category, EditorConfig, EditorEvent, EditorSession, EntityKind, FileSnapshotStore,
    HttpBackend, MemoryBackend, SaveOutcome, Snapshots, SubscriptionFilter,
};
use serde_json::Value;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "eventpvp-config", version, about = "Edit Event-PVP plugin configuration")]
struct Cli {
    /// JSON config file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Plugin web server address.
    #[arg(long, env = "EVENTPVP_URL")]
    base_url: Option<String>,

    /// Access token for the web editor.
    #[arg(long, env = "EVENTPVP_TOKEN")]
    token: Option<String>,

    /// Directory for document snapshots.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Run against built-in sample data instead of a server.
    #[arg(long)]
    demo: bool,

    /// UI language.
    #[arg(long)]
    lang: Option<String>,

    /// Log at debug level.
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive editing shell (default).
    Shell,
    /// Print one document as YAML.
    Show { category: String },
    /// List events, worlds or equipment sets.
    List { kind: String },
    /// Write the export envelope to a file, or stdout.
    Export { file: Option<PathBuf> },
    /// Import an export envelope and save it.
    Import { file: PathBuf },
    /// Ask the plugin to reload its configuration.
    Reload,
    /// Show server status.
    Status,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }

    let backend: Arc<dyn Backend> = if cli.demo {
        Arc::new(MemoryBackend::demo())
    } else {
        Arc::new(HttpBackend::new(config.base_url.clone(), config.request_timeout()))
    };
    let snapshots = match &config.data_dir {
        Some(dir) => Snapshots::new(Arc::new(FileSnapshotStore::open(dir)?)),
        None => Snapshots::in_memory(),
    };

    let mut session = EditorSession::new(config, backend, snapshots);
    let toasts = session.subscribe(SubscriptionFilter::toasts());

    let mut ready = session.init();
    if !ready {
        if let Some(token) = &cli.token {
            ready = session.login(token).is_ok();
        }
    }
    if let Some(code) = &cli.lang {
        if let Err(e) = session.change_language(code) {
            tracing::warn!(language = %code, error = %e, "language change failed");
        }
    }
    print_toasts(&toasts);
    if !ready {
        eprintln!("{}", session.t("auth.required"));
        return Ok(());
    }

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => shell(&mut session, &toasts)?,
        Command::Show { category } => match Category::parse(&category) {
            Some(category) => print!("{}", session.yaml_preview(category)?),
            None => eprintln!("unknown category: {category}"),
        },
        Command::List { kind } => list(&session, &kind),
        Command::Export { file } => {
            let text = session.export_json()?;
            match file {
                Some(path) => std::fs::write(path, text)?,
                None => println!("{text}"),
            }
        }
        Command::Import { file } => {
            let text = std::fs::read_to_string(file)?;
            if session.import_json(&text).is_ok() {
                session.save_all();
            }
        }
        Command::Reload => {
            let _ = session.reload_server();
        }
        Command::Status => match session.check_status() {
            Some(status) => println!(
                "{} {} | players {}/{} | tps {:.1}",
                status.plugin_name,
                status.plugin_version,
                status.online_players,
                status.max_players,
                status.tps
            ),
            None => println!("{}", session.t("status.notConnected")),
        },
    }
    print_toasts(&toasts);
    Ok(())
}

fn print_toasts(toasts: &eventpvp_config::SubscriptionHandle) {
    for event in toasts.drain() {
        if let EditorEvent::Toast { level, message, .. } = event {
            eprintln!("[{level:?}] {message}");
        }
    }
}

fn parse_kind(kind: &str) -> Option<EntityKind> {
    match kind {
        "event" | "events" => Some(EntityKind::Event),
        "world" | "worlds" => Some(EntityKind::World),
        "equipment" | "equip" => Some(EntityKind::Equipment),
        _ => None,
    }
}

fn list(session: &EditorSession, kind: &str) {
    match parse_kind(kind) {
        Some(EntityKind::Event) => {
            for card in session.events_view().cards() {
                let state = if card.enabled { "on " } else { "off" };
                println!("[{state}] {:<20} /{} ({})", card.id, card.command, card.display_name);
            }
        }
        Some(EntityKind::World) => {
            for card in session.worlds_view().cards() {
                println!(
                    "{:<20} {}",
                    card.id,
                    card.spawn_type.as_deref().unwrap_or("-")
                );
            }
        }
        Some(EntityKind::Equipment) => {
            for card in session.equipment_view().cards() {
                println!("{:<20} {} items", card.id, card.inventory_count);
            }
        }
        None => eprintln!("unknown kind: {kind}"),
    }
}

const HELP: &str = "\
commands:
  list <events|worlds|equipment>
  show <settings|worlds|equipment|webconfig>
  set <category> <path> <json>
  delete <event|world|equipment> <id>
  auto <add|remove|up|down> <event-id>
  theme <kind> <#rrggbb> | theme reset
  lang <code>
  undo | redo | save | discard
  status | reload
  export <file> | import <file>
  quit";

fn shell(
    session: &mut EditorSession,
    toasts: &eventpvp_config::SubscriptionHandle,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    println!("{}", HELP);

    loop {
        let nav = session.nav_counts();
        let marker = if session.has_unsaved_changes() { "*" } else { "" };
        print!(
            "[events {} | worlds {} | equipment {}]{marker}> ",
            nav.events, nav.worlds, nav.equipment
        );
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = words.split_first() else {
            continue;
        };

        let result = match (command, args) {
            ("quit" | "exit", _) => break,
            ("help", _) => {
                println!("{HELP}");
                Ok(())
            }
            ("list", [kind]) => {
                list(session, kind);
                Ok(())
            }
            ("show", [category]) => match Category::parse(category) {
                Some(category) => session.yaml_preview(category).map(|yaml| print!("{yaml}")),
                None => {
                    eprintln!("unknown category: {category}");
                    Ok(())
                }
            },
            ("set", [category, path, rest @ ..]) if !rest.is_empty() => {
                let raw = rest.join(" ");
                let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
                match Category::parse(category) {
                    Some(Category::Web) => session.update_web_config(path, value),
                    Some(category) => session.record(eventpvp_config::ChangeRecord::set(category, *path, value)),
                    None => {
                        eprintln!("unknown category: {category}");
                        Ok(())
                    }
                }
            }
            ("delete", [kind, id]) => match parse_kind(kind) {
                Some(EntityKind::Event) => session.delete_event(id),
                Some(EntityKind::World) => session.delete_world(id),
                Some(EntityKind::Equipment) => session.delete_equipment(id),
                None => {
                    eprintln!("unknown kind: {kind}");
                    Ok(())
                }
            },
            ("auto", [op, id]) => {
                let changed = match *op {
                    "add" => session.add_auto_event(id),
                    "remove" => session.remove_auto_event(id),
                    "up" => session.move_auto_event_up(id),
                    "down" => session.move_auto_event_down(id),
                    _ => Ok(false),
                };
                changed.map(|_| println!("{}", session.selected_auto_events().join(", ")))
            }
            ("theme", ["reset"]) => session.reset_theme(),
            ("theme", [kind, hex]) => session.update_theme_color(kind, hex),
            ("lang", [code]) => session.change_language(code),
            ("undo", _) => session.undo(),
            ("redo", _) => session.redo(),
            ("save", _) => {
                if let SaveOutcome::Partial { failed, .. } = session.save_all() {
                    eprintln!("not saved: {failed:?}");
                }
                Ok(())
            }
            ("discard", _) => {
                session.discard();
                Ok(())
            }
            ("status", _) => {
                session.check_status();
                Ok(())
            }
            ("reload", _) => session.reload_server(),
            ("export", [file]) => session
                .export_json()
                .and_then(|text| std::fs::write(file, text).map_err(Into::into)),
            ("import", [file]) => std::fs::read_to_string(file)
                .map_err(Into::into)
                .and_then(|text| session.import_json(&text)),
            _ => {
                eprintln!("unknown command, try `help`");
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::debug!(error = %e, "command failed");
            eprintln!("error: {e}");
        }
        print_toasts(toasts);
    }

    if session.has_unsaved_changes() {
        eprintln!("{}", session.t("history.unsavedOnExit"));
    }
    Ok(())
}
