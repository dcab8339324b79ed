//! RAX FTP client - Entry Point
//!
//! Uploads one file to an FTP server.

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

use rax_ftp_client::client::{TcpConnection, TransferSession, login, quit};
use rax_ftp_client::config::{ClientConfig, DEFAULT_CONFIG_PATH};
use rax_ftp_client::error::UploadError;
use rax_ftp_client::error::handlers::{error_to_exit_code, handle_error};
use rax_ftp_client::transfer::{
    ContentMode, StoreVariant, TransferMode, UploadRequest, UploadSummary, put_file,
};
use rax_ftp_client::utils::logging::setup_logging;

#[derive(Parser, Debug)]
#[command(name = "rax-ftpc", version, about = "Upload a file to an FTP server")]
struct Cli {
    /// Server host name or address
    host: String,

    /// Local file to upload
    local: PathBuf,

    /// Remote path; defaults to the local file name
    remote: Option<String>,

    #[arg(short, long, default_value_t = 21)]
    port: u16,

    #[arg(short, long, default_value = "anonymous")]
    user: String,

    #[arg(long, env = "RAX_FTPC_PASSWORD", default_value = "anonymous@")]
    password: String,

    /// Append to the remote file (APPE)
    #[arg(long, conflicts_with = "unique")]
    append: bool,

    /// Let the server choose the remote name (STOU)
    #[arg(long)]
    unique: bool,

    /// Continue an interrupted upload from the remote file's size
    #[arg(long, conflicts_with_all = ["append", "unique"])]
    resume: bool,

    /// Text transfer: send line feeds as CR LF
    #[arg(long)]
    ascii: bool,

    /// Use PORT instead of PASV
    #[arg(long)]
    active: bool,

    /// Configuration file, without the .toml extension
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn request(&self) -> UploadRequest {
        let remote = self.remote.clone().unwrap_or_else(|| {
            self.local
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let variant = if self.append {
            StoreVariant::Append
        } else if self.unique {
            StoreVariant::Unique
        } else {
            StoreVariant::Normal
        };
        let content = if self.ascii {
            ContentMode::Text
        } else {
            ContentMode::Binary
        };
        UploadRequest::new(&self.local, remote)
            .variant(variant)
            .resume(self.resume)
            .content(content)
    }
}

/// Connects, logs in, uploads, and logs out. Blocking.
fn run(cli: &Cli, config: &ClientConfig) -> Result<UploadSummary, UploadError> {
    let (mut conn, greeting) = TcpConnection::connect((cli.host.as_str(), cli.port), config)?;
    info!("Connected to {}:{}: {}", cli.host, cli.port, greeting);

    let passive = config.passive && !cli.active;
    let mut session = TransferSession::new(if passive {
        TransferMode::Passive
    } else {
        TransferMode::Active
    });

    login(&mut conn, &mut session, &cli.user, &cli.password)?;
    let result = put_file(&mut conn, &mut session, config, &cli.request());
    if let Err(e) = quit(&mut conn, &mut session) {
        info!("QUIT failed: {}", e);
    }
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = match ClientConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::from(1);
        }
    };

    info!("Uploading {} to {}", cli.local.display(), cli.host);

    // The transfer is blocking I/O; keep it off the async workers so
    // Ctrl-C can still be observed.
    let upload = tokio::task::spawn_blocking(move || run(&cli, &config));

    tokio::select! {
        joined = upload => match joined {
            Ok(Ok(summary)) => {
                info!(
                    "{} bytes stored as {} ({})",
                    summary.bytes_transferred, summary.remote_path, summary.reply
                );
                ExitCode::SUCCESS
            }
            Ok(Err(e)) => {
                handle_error(&e);
                ExitCode::from(error_to_exit_code(&e) as u8)
            }
            Err(e) => {
                error!("Upload task failed: {}", e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            error!("Interrupted; upload abandoned");
            // The runtime would wait for the blocking task on shutdown.
            std::process::exit(130)
        }
    }
}
