use clap::Args as ClapArgs;
use std::path::PathBuf;

/// Name of the log file written under the config directory.
pub const LOG_FILE_NAME: &str = "streamlite.log";

/// Command line / environment surface of the server.
#[derive(ClapArgs, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8082)]
    pub port: u16,

    /// Root directory scanned for videos
    #[arg(long, env = "VIDEO_DIR", default_value = "./videos")]
    pub video_dir: PathBuf,

    /// Directory holding the log file
    #[arg(long, env = "CONFIG_DIR", default_value = "./config")]
    pub config_dir: PathBuf,

    /// PostgreSQL connection string. Without it the catalog lives in memory.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Comma-separated CORS origins, or `*` for any
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "*", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// Skip the catalog scan at startup
    #[arg(long, env = "SKIP_STARTUP_SCAN", default_value_t = false)]
    pub no_startup_scan: bool,

    /// Log to stdout only
    #[arg(long, env = "DISABLE_LOG_FILE", default_value_t = false)]
    pub no_log_file: bool,
}

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub video_dir: PathBuf,
    pub config_dir: PathBuf,
    pub database_url: Option<String>,
    pub cors_allowed_origins: Vec<String>,
    pub startup_scan: bool,
    pub log_to_file: bool,
}

impl Config {
    pub fn from_args(args: ServeArgs) -> Self {
        let cors_allowed_origins = args
            .allowed_origins
            .into_iter()
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Self {
            server_host: args.host,
            server_port: args.port,
            video_dir: args.video_dir,
            config_dir: args.config_dir,
            database_url: args.database_url.filter(|url| !url.trim().is_empty()),
            cors_allowed_origins,
            startup_scan: !args.no_startup_scan,
            log_to_file: !args.no_log_file,
        }
    }

    /// Config for a server over `video_dir` with every other setting at its
    /// default. Used by tests and embedders.
    pub fn for_video_dir(video_dir: impl Into<PathBuf>) -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 8082,
            video_dir: video_dir.into(),
            config_dir: PathBuf::from("./config"),
            database_url: None,
            cors_allowed_origins: vec!["*".to_string()],
            startup_scan: false,
            log_to_file: false,
        }
    }

    /// True when any origin may call the API.
    pub fn cors_permissive(&self) -> bool {
        self.cors_allowed_origins.is_empty()
            || self.cors_allowed_origins.iter().any(|origin| origin == "*")
    }

    pub fn log_file_path(&self) -> PathBuf {
        self.config_dir.join(LOG_FILE_NAME)
    }

    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        if self.log_to_file {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }
}
