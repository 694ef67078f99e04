// sftpship Core Library (russh 기반)
// author: kodeholic
//
// collection → processing → (SFTP 업로드) → done 단계 이동 파이프라인

pub mod config;
pub mod connect;
pub mod error;
pub mod fs;
pub mod job;
pub mod known_hosts;
pub mod mover;
pub mod remote;
pub mod retry;
pub mod selector;
pub mod session;
pub mod sftp;
pub mod state;
pub mod upload;
pub mod utils;
