use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

/// Default call-record store base URL used when `CALL_STORE_BASE_URL` is not set.
pub const DEFAULT_CALL_STORE_BASE_URL: &str = "http://localhost:5100";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The base URL of the call-record store service.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_CALL_STORE_BASE_URL)]
    call_store_base_url: String,

    /// The API key to use when calling the call-record store.
    #[arg(long, env)]
    call_store_api_key: Option<String>,

    /// Shared secret the transcription pipeline sends in `x-webhook-secret`.
    /// When unset, webhook deliveries are accepted without the header.
    #[arg(long, env)]
    webhook_secret: Option<String>,

    /// The API key dashboard clients must send in `x-api-key` to read metrics.
    #[arg(long, env)]
    metrics_api_key: Option<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Returns the call-record store base URL.
    pub fn call_store_base_url(&self) -> &str {
        &self.call_store_base_url
    }

    /// Returns the call-record store API key, if configured.
    pub fn call_store_api_key(&self) -> Option<String> {
        self.call_store_api_key.clone()
    }

    /// Returns the shared webhook secret, if configured.
    pub fn webhook_secret(&self) -> Option<String> {
        self.webhook_secret.clone()
    }

    /// Returns the metrics API key, if configured.
    pub fn metrics_api_key(&self) -> Option<String> {
        self.metrics_api_key.clone()
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}
