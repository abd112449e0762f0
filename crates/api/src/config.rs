use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running next to the supervisor
/// on a developer machine; override via environment variables (a
/// `.env` file is honored by `main`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8899`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// Empty means permissive (local dashboard default).
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Interval between supervisor scans in seconds (default: `600`).
    pub scan_interval_secs: u64,
    /// Directory for `state.json`, text artifacts and `icons/`.
    pub data_dir: PathBuf,
    /// Name of this service in the supervisor listing, skipped during
    /// scans so the dashboard never tiles itself.
    pub self_name: String,
    /// Supervisor listing command, whitespace-split into program + args.
    pub supervisor_cmd: String,
    /// Path to the supervisor's own state file (workdir lookups).
    pub supervisor_state_path: PathBuf,
    /// Supervisor command timeout in seconds (default: `10`).
    pub scan_timeout_secs: u64,
    /// HTML probe / homepage fetch timeout in seconds (default: `5`).
    pub probe_timeout_secs: u64,
    /// Text generation command, whitespace-split into program + args.
    /// The prompt is piped to its stdin.
    pub text_generator_cmd: String,
    /// Prompt-to-image generator binary.
    pub generate_image_bin: PathBuf,
    /// Background remover binary.
    pub remove_background_bin: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                        |
    /// |--------------------------|--------------------------------|
    /// | `HOST`                   | `0.0.0.0`                      |
    /// | `PORT`                   | `8899`                         |
    /// | `CORS_ORIGINS`           | (empty, permissive)            |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                           |
    /// | `SCAN_INTERVAL_SECS`     | `600`                          |
    /// | `DATA_DIR`               | `local`                        |
    /// | `SELF_NAME`              | `tessera`                      |
    /// | `SUPERVISOR_CMD`         | `auto -q ps`                   |
    /// | `SUPERVISOR_STATE_PATH`  | `$HOME/.auto/state.json`       |
    /// | `SCAN_TIMEOUT_SECS`      | `10`                           |
    /// | `PROBE_TIMEOUT_SECS`     | `5`                            |
    /// | `TEXT_GENERATOR_CMD`     | `llm`                          |
    /// | `GENERATE_IMAGE_BIN`     | `$HOME/bin/generate_image`     |
    /// | `REMOVE_BACKGROUND_BIN`  | `$HOME/bin/remove-background`  |
    pub fn from_env() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8899".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let scan_interval_secs: u64 = std::env::var("SCAN_INTERVAL_SECS")
            .unwrap_or_else(|_| "600".into())
            .parse()
            .expect("SCAN_INTERVAL_SECS must be a valid u64");

        let data_dir = std::env::var("DATA_DIR")
            .unwrap_or_else(|_| "local".into())
            .into();

        let self_name = std::env::var("SELF_NAME").unwrap_or_else(|_| "tessera".into());

        let supervisor_cmd =
            std::env::var("SUPERVISOR_CMD").unwrap_or_else(|_| "auto -q ps".into());

        let supervisor_state_path = std::env::var("SUPERVISOR_STATE_PATH")
            .unwrap_or_else(|_| format!("{home}/.auto/state.json"))
            .into();

        let scan_timeout_secs: u64 = std::env::var("SCAN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("SCAN_TIMEOUT_SECS must be a valid u64");

        let probe_timeout_secs: u64 = std::env::var("PROBE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("PROBE_TIMEOUT_SECS must be a valid u64");

        let text_generator_cmd =
            std::env::var("TEXT_GENERATOR_CMD").unwrap_or_else(|_| "llm".into());

        let generate_image_bin = std::env::var("GENERATE_IMAGE_BIN")
            .unwrap_or_else(|_| format!("{home}/bin/generate_image"))
            .into();

        let remove_background_bin = std::env::var("REMOVE_BACKGROUND_BIN")
            .unwrap_or_else(|_| format!("{home}/bin/remove-background"))
            .into();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            scan_interval_secs,
            data_dir,
            self_name,
            supervisor_cmd,
            supervisor_state_path,
            scan_timeout_secs,
            probe_timeout_secs,
            text_generator_cmd,
            generate_image_bin,
            remove_background_bin,
        }
    }

    /// Split a whitespace-separated command string into program + args.
    ///
    /// Panics when the command is empty, which is the desired behavior
    /// at startup; misconfiguration should fail fast.
    pub fn split_command(cmd: &str) -> (String, Vec<String>) {
        let mut parts = cmd.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_else(|| {
            panic!("command string must not be empty: {cmd:?}");
        });
        (program, parts.collect())
    }
}
