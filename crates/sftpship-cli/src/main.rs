// sftpship CLI
// author: kodeholic
//
// Usage: sftpship [--config config.json]
//
// 실행 1회 = collection 스캔 → processing → SFTP 업로드 → done
// 주기 실행은 cron / 작업 스케줄러에 맡김
//
// exit code
//   0 : 실행 완료 (개별 파일 실패 포함, 로그 참고)
//   1 : 설정/로그 파일 오류, collection 조회 실패, 접속 재시도 소진

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sftpship_core::config::JobConfig;
use tracing::{error, info};

mod handler;
mod logging;

#[derive(Parser)]
#[command(name = "sftpship", version, about = "Ship collected files to an SFTP server")]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, env = "SFTPSHIP_CONFIG", default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 로거보다 먼저 → stderr 로만 보고
    let config = match JobConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // RUST_LOG=debug sftpship  (단계 전이까지 출력)
    let _guard = match logging::init(&config.log_file) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: cannot open log file {}: {}", config.log_file, e);
            return ExitCode::FAILURE;
        }
    };

    match handler::run(&config).await {
        Ok(summary) => {
            info!(
                "Run finished: staged={} leftovers={}",
                summary.staged,
                summary.leftovers.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}
