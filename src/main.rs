use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
};

use clap::Parser;
use lanshare::{netinfo, qr, router, AppState, Config};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// --- Configuration ---
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The directory to share
    #[arg(value_name = "DIR", default_value = ".")]
    root_dir: PathBuf,

    /// Address to bind to
    #[arg(short, long, env = "LANSHARE_BIND", default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "LANSHARE_PORT", default_value_t = 8000)]
    port: u16,

    /// TOML config file with upload limit and UI settings
    #[arg(short, long, env = "LANSHARE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the UI's CSS/JS (overrides the config file)
    #[arg(long, env = "LANSHARE_ASSETS", value_name = "DIR")]
    assets: Option<PathBuf>,

    /// Don't print the connect QR code on startup
    #[arg(long)]
    no_qr: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "lanshare=debug,tower_http=debug"
    } else {
        "lanshare=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path).unwrap_or_else(|e| fail(&e.to_string())),
        None => Config::default(),
    };
    if let Some(assets) = args.assets {
        config.assets_dir = assets;
    }
    if args.no_qr {
        config.show_terminal_qr = false;
    }

    let root_dir = match tokio::fs::canonicalize(&args.root_dir).await {
        Ok(path) => path,
        Err(e) => fail(&format!(
            "Failed to resolve root directory '{}': {}",
            args.root_dir.display(),
            e
        )),
    };
    if !root_dir.is_dir() {
        fail(&format!(
            "Root path '{}' is not a directory.",
            root_dir.display()
        ));
    }
    if !config.assets_dir.is_dir() {
        warn!(
            "Assets directory '{}' not found; pages will render unstyled",
            config.assets_dir.display()
        );
    }

    let bind_addr = SocketAddr::new(args.bind, args.port);
    let show_qr = config.show_terminal_qr;
    let state = AppState::new(root_dir.clone(), args.port, config);
    let app = router(state);

    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
        Ok(l) => l,
        Err(e) => fail(&format!("Failed to bind to address {}: {}", bind_addr, e)),
    };

    let lan_url = format!("http://{}:{}", netinfo::local_ipv4(), args.port);
    info!("Serving directory: {}", root_dir.display());
    info!("Listening on: {}", bind_addr);
    info!("Local network access: {}", lan_url);
    info!("Local access: http://localhost:{}", args.port);
    if show_qr {
        print_connect_banner(&lan_url);
    }

    let service = app.into_make_service_with_connect_info::<SocketAddr>();
    if let Err(e) = axum::serve(listener, service).await {
        fail(&format!("Server error: {}", e));
    }
}

fn print_connect_banner(url: &str) {
    let rule = "=".repeat(50);
    match qr::terminal(url) {
        Ok(code) => {
            println!("\n{rule}\nSCAN QR CODE TO CONNECT:\n{rule}\n{code}\n{rule}\nServer URL: {url}\n{rule}\n");
        }
        Err(e) => warn!("Could not render QR code for {}: {}", url, e),
    }
}

fn fail(message: &str) -> ! {
    error!("{}", message);
    eprintln!("Error: {}", message);
    std::process::exit(1);
}
