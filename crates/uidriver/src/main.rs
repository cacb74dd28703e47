use clap::Parser;
use clap::Subcommand;
use serde_json::Value;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use uidriver_daemon::DaemonConfig;
use uidriver_daemon::NoopBackend;
use uidriver_daemon::UiBackend;
use uidriver_daemon::start_daemon;
use uidriver_ipc::ClientError;
use uidriver_ipc::DaemonClient;
use uidriver_ipc::error_codes::ErrorCategory;

const LONG_ABOUT: &str = r#"uidriver drives UI interactions on a device under test.

WORKFLOW:
    1. Start the daemon
    2. Open a session against the device
    3. Find elements to cache references, or aim at raw coordinates
    4. Send gestures (tap, long-tap, drag) at references or coordinates
    5. Delete the session when done

TARGETS:
    Gesture commands accept either an element reference returned by 'find'
    or an explicit --x/--y pair. References go stale when the UI changes;
    re-run 'find' and retry when the daemon reports element_not_found.

EXAMPLES:
    uidriver daemon &
    uidriver new-session
    uidriver find by-id submit_button
    uidriver tap --element ab12cd34
    uidriver tap --x 120 --y 640
    uidriver delete-session <id>"#;

#[derive(Parser)]
#[command(name = "uidriver")]
#[command(author, version)]
#[command(about = "Remote command daemon for driving UI tests on a device")]
#[command(long_about = LONG_ABOUT)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Session ID to use (default: the daemon's active session)
    #[arg(short, long, global = true)]
    session: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daemon in the foreground
    Daemon,
    /// Print daemon status counters
    Status,
    /// List sessions
    Sessions,
    /// Open a new session and make it active
    NewSession,
    /// Delete a session
    DeleteSession {
        /// Session ID to delete
        id: String,
    },
    /// Tap an element or a coordinate pair
    Tap {
        #[command(flatten)]
        target: Target,
    },
    /// Double-tap an element or a coordinate pair
    DoubleTap {
        #[command(flatten)]
        target: Target,
    },
    /// Long-press an element or a coordinate pair
    LongTap {
        #[command(flatten)]
        target: Target,

        /// Press duration in milliseconds
        #[arg(long, default_value_t = 500)]
        duration_ms: u64,
    },
    /// Find an element and cache a reference to it
    Find {
        /// Selector strategy: by-id, by-name, by-link-text,
        /// by-partial-link-text, by-xpath, by-class-name, by-vendor-query
        strategy: String,
        /// Lookup string for the strategy
        selector: String,
    },
    /// Print an element's current rectangle
    Rect {
        /// Element reference id from a previous find
        element: String,
    },
}

#[derive(Debug, clap::Args)]
struct Target {
    /// Element reference id from a previous find
    #[arg(short, long)]
    element: Option<String>,

    /// Explicit x coordinate in device pixels
    #[arg(short, long, allow_hyphen_values = true)]
    x: Option<i32>,

    /// Explicit y coordinate in device pixels
    #[arg(short, long, allow_hyphen_values = true)]
    y: Option<i32>,
}

impl Target {
    fn into_params(self, session: Option<String>) -> Value {
        let mut params = json!({});
        if let Some(element) = self.element {
            params["element"] = json!(element);
        }
        if let Some(x) = self.x {
            params["x"] = json!(x);
        }
        if let Some(y) = self.y {
            params["y"] = json!(y);
        }
        if let Some(session) = session {
            params["session"] = json!(session);
        }
        params
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        let code = e
            .downcast_ref::<ClientError>()
            .map(exit_code_for_client_error)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn exit_code_for_client_error(error: &ClientError) -> i32 {
    match error.category() {
        Some(ErrorCategory::InvalidInput) => 64, // EX_USAGE
        Some(ErrorCategory::NotFound) => 69,     // EX_UNAVAILABLE
        Some(ErrorCategory::Busy) => 73,         // EX_CANTCREAT
        Some(ErrorCategory::InvalidState) => 75, // EX_TEMPFAIL
        Some(ErrorCategory::External) | Some(ErrorCategory::Internal) => 74, // EX_IOERR
        None => 1,
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let session = cli.session;
    match cli.command {
        Commands::Daemon => {
            let backends = Box::new(|| Ok(Box::new(NoopBackend) as Box<dyn UiBackend>));
            start_daemon(DaemonConfig::from_env(), backends)?;
            Ok(())
        }
        Commands::Status => call("status", json!({})),
        Commands::Sessions => call("sessions", json!({})),
        Commands::NewSession => call("new_session", json!({})),
        Commands::DeleteSession { id } => call("delete_session", json!({ "session": id })),
        Commands::Tap { target } => call("tap", target.into_params(session)),
        Commands::DoubleTap { target } => call("double_tap", target.into_params(session)),
        Commands::LongTap {
            target,
            duration_ms,
        } => {
            let mut params = target.into_params(session);
            params["duration_ms"] = json!(duration_ms);
            call("long_tap", params)
        }
        Commands::Find { strategy, selector } => {
            let mut params = json!({ "strategy": strategy, "selector": selector });
            if let Some(session) = session {
                params["session"] = json!(session);
            }
            call("find_element", params)
        }
        Commands::Rect { element } => {
            let mut params = json!({ "element": element });
            if let Some(session) = session {
                params["session"] = json!(session);
            }
            call("element_rect", params)
        }
    }
}

fn call(method: &str, params: Value) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = DaemonClient::connect()?;
    let result = client.call(method, Some(params))?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
