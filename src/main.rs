// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Haavi CLI - Transparent Interception Relay
//!
//! Exchanges are written to stdout as JSON lines, logs go to stderr.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use reqwest::Method;
use url::Url;

use haavi::network::{Interceptor, JsonLinesObserver, LogObserver, ObserverHub};
use haavi::{PreviewConfig, RelayConfig, RelayServer, Request};

#[derive(Parser)]
#[command(name = "haavi", version, about = "Transparent HTTP interception relay")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send one request through the interceptor and print its exchange
    Fetch {
        /// Target URL
        url: String,
        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
        /// Extra request header as `Name: value`, repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        /// Request body
        #[arg(short, long)]
        data: Option<String>,
        #[command(flatten)]
        relay: RelayArgs,
    },
    /// Relay every request on the listen address to an upstream
    Relay {
        /// Local address to accept requests on
        #[arg(long, env = "HAAVI_LISTEN", default_value = "127.0.0.1:8080")]
        listen: SocketAddr,
        /// Upstream base URL
        #[arg(long, env = "HAAVI_UPSTREAM")]
        upstream: Url,
        #[command(flatten)]
        relay: RelayArgs,
    },
}

#[derive(Args)]
struct RelayArgs {
    /// Maximum characters in a body preview
    #[arg(long, env = "HAAVI_PREVIEW_CHARS", default_value_t = PreviewConfig::default().max_chars)]
    preview_chars: usize,
    /// Maximum lines in a body preview
    #[arg(long, env = "HAAVI_PREVIEW_LINES", default_value_t = PreviewConfig::default().max_lines)]
    preview_lines: usize,
    /// Path never intercepted
    #[arg(long, env = "HAAVI_BOOTSTRAP_PATH", default_value = haavi::DEFAULT_BOOTSTRAP_PATH)]
    bootstrap_path: String,
    /// Upstream timeout in seconds
    #[arg(long, env = "HAAVI_TIMEOUT", default_value_t = 30)]
    timeout: u64,
    /// Accept invalid upstream certificates
    #[arg(long, env = "HAAVI_INSECURE")]
    insecure: bool,
}

impl RelayArgs {
    fn to_config(&self) -> RelayConfig {
        RelayConfig::new()
            .preview(
                PreviewConfig::new()
                    .max_chars(self.preview_chars)
                    .max_lines(self.preview_lines),
            )
            .bootstrap_path(self.bootstrap_path.clone())
            .timeout(Duration::from_secs(self.timeout))
            .accept_invalid_certs(self.insecure)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("haavi=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Fetch {
            url,
            method,
            headers,
            data,
            relay,
        } => fetch(&url, &method, &headers, data, &relay).await,
        Command::Relay {
            listen,
            upstream,
            relay,
        } => serve(listen, upstream, &relay).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn fetch(
    url: &str,
    method: &str,
    headers: &[String],
    data: Option<String>,
    args: &RelayArgs,
) -> anyhow::Result<()> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid method: {}", method))?;

    let mut request = Request::new(method, url)?;
    for header in headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| anyhow!("Header must look like `Name: value`: {}", header))?;
        request = request.header(name.trim(), value.trim());
    }
    if let Some(data) = data {
        request = request.body(data);
    }

    let sink = Arc::new(JsonLinesObserver::stdout()?);
    let hub = Arc::new(ObserverHub::new());
    hub.register_arc(sink.clone());

    let interceptor = Interceptor::from_config(&args.to_config(), hub)?;
    let result = interceptor.intercept(request).await;

    // Releases the hub's handle on the sink so the queued line can be written out.
    drop(interceptor);
    if let Ok(sink) = Arc::try_unwrap(sink) {
        sink.finish()?;
    }
    let response = result?;

    tracing::info!(
        status = response.status_code(),
        bytes = response.body_len(),
        url = %response.url,
        "Fetched"
    );
    Ok(())
}

async fn serve(listen: SocketAddr, upstream: Url, args: &RelayArgs) -> anyhow::Result<()> {
    let hub = Arc::new(ObserverHub::new());
    hub.register(JsonLinesObserver::stdout()?);
    hub.register(LogObserver);

    let interceptor = Interceptor::from_config(&args.to_config(), hub)?;
    let server = RelayServer::new(listen, upstream, interceptor)?;
    server.run().await?;
    Ok(())
}
