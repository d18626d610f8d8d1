//! Junggo MCP Server
//!
//! Run with: junggo-mcp-server --backend-url http://backend:3000

use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use junggo::config::{BackendConfig, ResourcePaths, DEFAULT_BACKEND_URL, DEFAULT_PORT};
use junggo::mcp::CatalogHandler;
use junggo::transport::{http, stdio};
use junggo::{QueryPolicy, ServerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    Http,
    Stdio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "junggo-mcp-server")]
#[command(about = "MCP server exposing the complaint backend to AI agents")]
struct Args {
    /// Backend base URL
    #[arg(long, env = "JUNGGO_BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    backend_url: String,

    /// Address to bind the HTTP transport to
    #[arg(long, env = "JUNGGO_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port for the HTTP transport
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Transport to serve MCP over
    #[arg(long, env = "JUNGGO_TRANSPORT", value_enum, default_value = "http")]
    transport: Transport,

    /// Backend resource holding customer users
    #[arg(long, env = "JUNGGO_USER_RESOURCE", default_value = "customer-users")]
    user_resource: String,

    /// Backend resource holding customer activity logs
    #[arg(long, env = "JUNGGO_USER_LOG_RESOURCE", default_value = "customer-user-logs")]
    user_log_resource: String,

    /// Which optional query values reach the backend (truthy or present)
    #[arg(long, env = "JUNGGO_QUERY_POLICY", default_value = "truthy")]
    query_policy: QueryPolicy,

    /// Backend request timeout in seconds (0 = disabled)
    #[arg(long, env = "JUNGGO_BACKEND_TIMEOUT_SECS", default_value = "0")]
    backend_timeout_secs: u64,

    /// Log output format
    #[arg(long, env = "JUNGGO_LOG_FORMAT", value_enum, default_value = "pretty")]
    log_format: LogFormat,
}

impl Args {
    fn server_config(&self) -> junggo::Result<ServerConfig> {
        let mut config = ServerConfig::for_backend(&self.backend_url)?;
        config.bind = SocketAddr::new(self.host, self.port);
        config.backend =
            BackendConfig::new(&self.backend_url)?.with_timeout_secs(self.backend_timeout_secs);
        config.resources = ResourcePaths {
            users: self.user_resource.clone(),
            user_logs: self.user_log_resource.clone(),
        };
        config.query_policy = self.query_policy;
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(format: LogFormat) {
    // Logs go to stderr; stdout carries MCP traffic in stdio mode
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_format);

    let config = args.server_config().context("invalid configuration")?;
    let handler = CatalogHandler::from_config(&config).context("failed to build catalog")?;

    tracing::info!(
        backend = %config.backend.base_url,
        users = %config.resources.users,
        user_logs = %config.resources.user_logs,
        query_policy = %config.query_policy,
        tools = handler.registry().tools().len(),
        prompts = handler.registry().prompts().len(),
        "Junggo MCP server starting..."
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    runtime.block_on(async {
        match args.transport {
            Transport::Http => http::serve(config.bind, handler).await,
            Transport::Stdio => stdio::serve(&handler).await,
        }
    })?;

    Ok(())
}
