// sftpship CLI Logging
// author: kodeholic
//
// 로그 2군데로 출력
//   - 파일  : "<LogFile>_YYYYMMDD.txt" (append, 실행일 기준 하루 1파일)
//   - stderr: RUST_LOG 로 레벨 조절 (기본 info)
//
// 반환된 WorkerGuard 는 main 이 끝날 때까지 들고 있어야 파일에 flush 됨

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub fn log_file_path(base: &str, date: NaiveDate) -> PathBuf {
    PathBuf::from(format!("{}_{}.txt", base, date.format("%Y%m%d")))
}

pub fn init(base: &str) -> io::Result<WorkerGuard> {
    let path = log_file_path(base, chrono::Local::now().date_naive());
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(false))
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .try_init()
        .map_err(io::Error::other)?;

    Ok(guard)
}
