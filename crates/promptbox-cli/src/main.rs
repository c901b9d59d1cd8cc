//! promptbox CLI: Prompt overlay for local text-generation backends

use clap::{Parser, Subcommand};
use promptbox_engine::{
    discover_backend, BackendConfig, CommandClient, Config, PromptDelivery, Session,
    WidgetController, WidgetState, CONFIG_FILE, PROMPTBOX_DIR,
};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Floating prompt box for local text-generation backends
#[derive(Parser)]
#[command(name = "promptbox")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of .promptbox/config.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui,

    /// Send one prompt to the backend and print the answer
    Ask {
        /// Prompt text; read from stdin when omitted
        prompt: Vec<String>,
    },

    /// Write a default config to .promptbox/config.json
    Init {
        /// Backend preset (ollama, llm, claude, gemini); detected when omitted
        #[arg(long)]
        backend: Option<String>,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Show the resolved backend and whether its command is available
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Log file inside the promptbox directory, used while the TUI owns the terminal.
const LOG_FILE: &str = "promptbox.log";

/// Environment variable holding the log filter.
const LOG_ENV: &str = "PROMPTBOX_LOG";

const FILE_LOG_FILTER: &str = "promptbox=info,promptbox_engine=info,promptbox_tui=info";
const STDERR_LOG_FILTER: &str = "promptbox=warn,promptbox_engine=warn,promptbox_tui=warn";

/// Backend presets tried in order by `init`.
const KNOWN_BACKENDS: [&str; 4] = ["ollama", "llm", "claude", "gemini"];

fn main() {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .unwrap_or_else(|| Path::new(PROMPTBOX_DIR).join(CONFIG_FILE));

    match cli.command {
        None | Some(Commands::Tui) => cmd_tui(&config_path),
        Some(Commands::Ask { prompt }) => cmd_ask(&config_path, &prompt),
        Some(Commands::Init { backend, force }) => cmd_init(&config_path, backend, force),
        Some(Commands::Doctor { json }) => cmd_doctor(&config_path, json),
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn load_config(path: &Path) -> Config {
    let config = Config::load_or_default(path)
        .unwrap_or_else(|e| fail(format!("{}: {e}", path.display())));
    tracing::debug!(path = %path.display(), backend = %config.backend.name, "config resolved");
    config
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().unwrap_or_else(|e| fail(format!("failed to start runtime: {e}")))
}

fn log_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Log to a file next to the config. The TUI owns stdout/stderr, so if the
/// file cannot be opened we run without logging.
fn init_file_logging(config_path: &Path) {
    let dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file = std::fs::create_dir_all(dir).and_then(|()| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(LOG_FILE))
    });

    if let Ok(file) = file {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(log_filter(FILE_LOG_FILTER))
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .try_init();
    }
}

fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(STDERR_LOG_FILTER))
        .with_writer(std::io::stderr)
        .try_init();
}

fn cmd_tui(config_path: &Path) {
    init_file_logging(config_path);
    let config = load_config(config_path);

    let client = Arc::new(CommandClient::new(config.backend.clone()));
    let rt = runtime();
    if let Err(e) = rt.block_on(promptbox_tui::run_tui(&config, client)) {
        fail(e);
    }
}

fn cmd_ask(config_path: &Path, words: &[String]) {
    init_stderr_logging();
    let config = load_config(config_path);

    let prompt = if words.is_empty() {
        read_stdin_prompt()
    } else {
        words.join(" ")
    };
    if prompt.trim().is_empty() {
        fail("prompt is empty");
    }

    let client = Arc::new(CommandClient::new(config.backend));
    let rt = runtime();
    let state = rt.block_on(async move {
        let mut session = Session::new(client, WidgetController::new());
        if !session.submit(prompt) {
            return None;
        }
        while session.is_loading() {
            session.next_completion().await;
        }
        session.state().cloned()
    });

    match state {
        Some(WidgetState::Result { result_text, .. }) => println!("{result_text}"),
        Some(WidgetState::Error { message, .. }) => fail(message),
        _ => fail("prompt was not submitted"),
    }
}

fn read_stdin_prompt() -> String {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return String::new();
    }
    let mut prompt = String::new();
    if let Err(e) = stdin.read_to_string(&mut prompt) {
        fail(format!("failed to read prompt from stdin: {e}"));
    }
    prompt
}

fn cmd_init(config_path: &Path, backend: Option<String>, force: bool) {
    if config_path.exists() && !force {
        println!("Config already exists at {}", config_path.display());
        return;
    }

    let backend = if let Some(name) = backend {
        BackendConfig::default_for(&name)
    } else {
        let detected = KNOWN_BACKENDS
            .iter()
            .map(|name| BackendConfig::default_for(name))
            .find(|backend| discover_backend(backend).found);
        if let Some(backend) = detected {
            println!("Found backend: {}", backend.name);
            backend
        } else {
            println!("Warning: No known backend found on PATH, using ollama");
            BackendConfig::default()
        }
    };

    let config = Config {
        backend,
        ..Config::default()
    };

    match config.save(config_path) {
        Ok(()) => println!("Created {}", config_path.display()),
        Err(e) => fail(format!("failed to write config: {e}")),
    }
}

fn delivery_name(delivery: PromptDelivery) -> &'static str {
    match delivery {
        PromptDelivery::Stdin => "stdin",
        PromptDelivery::Argument => "argument",
    }
}

fn cmd_doctor(config_path: &Path, json: bool) {
    init_stderr_logging();
    let config = load_config(config_path);
    let status = discover_backend(&config.backend);
    let hotkey = config.parsed_hotkey().map(|h| h.to_string());

    if json {
        let output = serde_json::json!({
            "config_path": config_path.display().to_string(),
            "config_found": config_path.exists(),
            "backend": config.backend,
            "status": status,
            "hotkey": hotkey.as_deref().unwrap_or(&config.hotkey),
            "open_on_start": config.open_on_start,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{text}"),
            Err(e) => fail(e),
        }
        return;
    }

    let source = if config_path.exists() {
        "loaded"
    } else {
        "not found, using defaults"
    };
    println!("Config: {} ({source})\n", config_path.display());

    println!("  Backend: {}", config.backend.name);
    println!("    Command: {}", config.backend.command_argv.join(" "));
    println!(
        "    Prompt delivery: {}",
        delivery_name(config.backend.prompt_delivery)
    );
    println!("    Timeout: {}s", config.backend.timeout_seconds);
    match &status.path {
        Some(path) => println!("    Path: {path}"),
        None => println!("    Path: not found"),
    }
    for issue in &status.issues {
        println!("    Issue: {issue}");
    }
    println!();

    println!("  Hotkey: {}", hotkey.as_deref().unwrap_or(&config.hotkey));
    println!("  Open on start: {}", config.open_on_start);
    println!();

    if status.found && status.issues.is_empty() {
        println!("Backend ready");
    } else {
        println!("Backend not ready");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_tui() {
        let cli = Cli::try_parse_from(["promptbox"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_ask_collects_words() {
        let cli = Cli::try_parse_from(["promptbox", "ask", "why", "is", "the", "sky", "blue"])
            .unwrap();
        match cli.command {
            Some(Commands::Ask { prompt }) => assert_eq!(prompt.join(" "), "why is the sky blue"),
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["promptbox", "doctor", "--json", "--config", "alt.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.json")));
        assert!(matches!(cli.command, Some(Commands::Doctor { json: true })));
    }

    #[test]
    fn test_delivery_names() {
        assert_eq!(delivery_name(PromptDelivery::Stdin), "stdin");
        assert_eq!(delivery_name(PromptDelivery::Argument), "argument");
    }
}
