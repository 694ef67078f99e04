// sftpship SFTP (russh-sftp 기반)
// author: kodeholic
//
// SftpClient : SSH 핸들 + SFTP 세션을 함께 소유
//              실행 1회 동안 순차적으로 재사용, 마지막에 close()

use async_trait::async_trait;
use russh::client;
use russh::Disconnect;
use russh_sftp::client::fs::File;
use russh_sftp::client::SftpSession;

use crate::error::{Error, Result};
use crate::remote::RemoteSession;
use crate::session::ClientHandler;

pub struct SftpClient {
    ssh: client::Handle<ClientHandler>,
    sftp: SftpSession,
}

impl SftpClient {
    pub fn new(ssh: client::Handle<ClientHandler>, sftp: SftpSession) -> Self {
        Self { ssh, sftp }
    }
}

#[async_trait]
impl RemoteSession for SftpClient {
    type Writer = File;

    /// CREATE | WRITE | TRUNCATE: 같은 이름이 있으면 덮어씀
    async fn create(&mut self, path: &str) -> Result<File> {
        self.sftp.create(path).await.map_err(|e| Error::RemoteCreate {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// SFTP 세션 → SSH 연결 순서로 닫음, 둘 다 시도
    async fn close(&mut self) -> Result<()> {
        let sftp_closed = self.sftp.close().await;
        self.ssh
            .disconnect(Disconnect::ByApplication, "", "en")
            .await?;
        sftp_closed?;
        tracing::info!("[sftp] session closed");
        Ok(())
    }
}
