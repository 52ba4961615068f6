//! CLI definitions

use clap::Parser;
use tracing::level_filters::LevelFilter;

/// secretsetter - Writes STDIN into Infisical with a secret name of SECRET_NAME
#[derive(Parser, Debug)]
#[command(name = "secretsetter")]
#[command(version)]
#[command(about = "Writes STDIN into Infisical with a secret name of SECRET_NAME")]
#[command(after_help = r#"ENVIRONMENT:
    INFISICAL_API_URL                        Infisical site URL (default: https://app.infisical.com)
    INFISICAL_PROJECT_ID                     Project the secret is written to
    INFISICAL_UNIVERSAL_AUTH_CLIENT_ID       Machine identity client id
    INFISICAL_UNIVERSAL_AUTH_CLIENT_SECRET   Machine identity client secret
    RUST_LOG                                 Overrides --log-level when set

EXAMPLES:
    echo -n "s3cr3t" | secretsetter --env dev --path /app mykey
    secretsetter --overwrite DATABASE_URL < database_url.txt"#)]
pub struct Cli {
    /// Name of the secret to write
    #[arg(value_name = "SECRET_NAME", value_parser = non_empty)]
    pub secret_name: String,

    /// Environment to use (dev|stage|prod)
    #[arg(long, default_value = "prod")]
    pub env: String,

    /// Path to use
    #[arg(long, default_value = "/")]
    pub path: String,

    /// Delete and recreate the secret if it already exists
    #[arg(short = 'o', long, visible_alias = "force")]
    pub overwrite: bool,

    /// Log level (debug|info|warning|error)
    #[arg(short = 'l', long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Verbosity requested on the command line
    pub fn level(&self) -> LogLevel {
        LogLevel::parse_lossy(&self.log_level)
    }
}

fn non_empty(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err("secret name cannot be empty".to_string());
    }
    Ok(value.to_string())
}

/// Whether a parse error is a real failure. Help and version output are not.
pub fn is_parse_failure(err: &clap::Error) -> bool {
    err.use_stderr()
}

/// Log verbosity accepted by `--log-level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parse a level name. Anything unrecognised is `Info`.
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "warning" | "warn" => LogLevel::Warning,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}
