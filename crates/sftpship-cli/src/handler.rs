// sftpship CLI Handler
// author: kodeholic
//
// core 호출 + 실행 이벤트를 tracing 로그로 변환

use sftpship_core::config::JobConfig;
use sftpship_core::fs::OsFs;
use sftpship_core::job::{self, RunSummary};
use sftpship_core::session::SshDialer;
use sftpship_core::state::{RunEvent, RunObserver, Stage};
use sftpship_core::utils::fmt_size;
use tracing::{debug, error, info, warn};

pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn on_stage_changed(&self, name: &str, prev: Stage, next: Stage) {
        debug!("[{}] {:?} → {:?}", name, prev, next);
    }

    fn on_event(&self, event: &RunEvent<'_>) {
        match event {
            RunEvent::Leftover { name, size } => {
                warn!("Leftover in processing (not retried): {} ({})", name, fmt_size(*size))
            }
            RunEvent::StageCollision { name, folder } => {
                warn!("Skip {}: same name already in {}", name, folder.display())
            }
            RunEvent::Moved { src, dst, bytes } => {
                info!("Moved {} → {} ({})", src.display(), dst.display(), fmt_size(*bytes))
            }
            RunEvent::MoveFailed { error } => error!("Move failed: {}", error),
            RunEvent::DiscardFailed { path, error } => {
                error!("Cannot remove leftover copy {}, file now in two folders: {}", path.display(), error)
            }
            RunEvent::NoFiles => info!("No files to upload"),
            RunEvent::ConnectFailed { addr, attempt, max_attempts, error } => {
                warn!("Connect {} failed ({}/{}): {}", addr, attempt, max_attempts, error)
            }
            RunEvent::Connected { addr, attempts } => {
                info!("Connected to {} (attempt {})", addr, attempts)
            }
            RunEvent::Uploaded { local, remote, bytes, elapsed } => info!(
                "SFTP upload finished `{}` -> `{}` Duration: {:?} ({})",
                local.display(),
                remote,
                elapsed,
                fmt_size(*bytes)
            ),
            RunEvent::UploadFailed { name, error } => {
                error!("Upload failed {}: {}", name, error)
            }
            RunEvent::Stranded { name, error } => {
                error!("Uploaded but stuck in processing {}: {}", name, error)
            }
            RunEvent::SessionCloseFailed { error } => {
                warn!("Session close failed: {}", error)
            }
            RunEvent::BatchFinished { delivered, failed, stranded } => info!(
                "Batch finished: delivered={} failed={} stranded={}",
                delivered, failed, stranded
            ),
        }
    }
}

pub async fn run(config: &JobConfig) -> sftpship_core::error::Result<RunSummary> {
    let connect = config.connect_config()?;
    if !config.title.is_empty() {
        info!("Job: {}", config.title);
    }
    info!("Start: {} → {}:{}", config.collection_folder.display(), connect.addr(), config.remote_sftp_path);

    let mut dialer = SshDialer::new(connect);
    job::run(config, &OsFs, &mut dialer, &TracingObserver).await
}
