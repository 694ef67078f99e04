// sftpship Error Types
// author: kodeholic
//
// Error     : 실행 단위 에러 (설정, 목록 조회, 접속, 전송)
// MoveError : copy → delete 이동의 실패 지점별 에러
//
// 하위 IO/네트워크 에러는 항상 경로/주소 문맥과 함께 감싼다.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::state::Stage;

/// StageMover 실패 지점
///
/// 어느 지점에서 실패했는지에 따라 파일시스템에 남는 상태가 다르다.
/// - SourceUnreadable / DestinationUnwritable : src 그대로
/// - CopyFailed         : src 그대로, dst 에 부분 사본이 남을 수 있음
/// - SourceDeleteFailed : src, dst 둘 다 존재 (중복, 유실 아님)
#[derive(Debug, Error)]
pub enum MoveError {
    #[error("cannot read source {}: {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create destination {}: {source}", .path.display())]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("copy {} -> {} failed: {source}", .src.display(), .dst.display())]
    CopyFailed {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("copied to {} but cannot delete source {}: {source}", .dst.display(), .src.display())]
    SourceDeleteFailed {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MoveError {
    /// 실패 후 dst 에 사본(부분 또는 전체)이 남았을 수 있으면 그 경로
    pub fn destination_left(&self) -> Option<&Path> {
        match self {
            MoveError::CopyFailed { dst, .. } | MoveError::SourceDeleteFailed { dst, .. } => {
                Some(dst.as_path())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot read config {}: {source}", .path.display())]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    ConfigInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid server address '{0}'")]
    InvalidServer(String),

    #[error("cannot list collection folder {}: {source}", .path.display())]
    CollectionUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid stage transition for {name}: {from:?} → {to:?}")]
    InvalidTransition { name: String, from: Stage, to: Stage },

    #[error("Connect to {addr} failed: {reason}")]
    Connect { addr: String, reason: String },

    #[error("Auth failed: {0}")]
    Auth(String),

    #[error("Host key rejected: {0}")]
    HostKey(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("SFTP error: {0}")]
    Sftp(String),

    #[error("Maximum connection retry attempt exceeded for {addr} ({attempts} attempts)")]
    ConnectionExhausted { addr: String, attempts: u32 },

    #[error("cannot open local file {}: {source}", .path.display())]
    LocalOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create remote file {path}: {reason}")]
    RemoteCreate { path: String, reason: String },

    #[error("upload to {path} failed: {source}")]
    Transfer {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl From<russh::Error> for Error {
    fn from(e: russh::Error) -> Self {
        Error::Protocol(e.to_string())
    }
}

impl From<russh_sftp::client::error::Error> for Error {
    fn from(e: russh_sftp::client::error::Error) -> Self {
        Error::Sftp(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
