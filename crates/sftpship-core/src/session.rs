// sftpship Session (russh 기반)
// author: kodeholic
//
// dial         : TCP 연결 + SSH 핸드셰이크 + 인증
// open_session : 세션 채널 + "sftp" 서브시스템 → SftpClient
//
// 두 단계 중 하나라도 실패하면 connect::connect_with_retry 가 처음부터 다시 시도

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use russh::client;
use russh::keys::key::PrivateKeyWithHashAlg;
use russh::keys::{PublicKey, PublicKeyBase64};
use russh_sftp::client::SftpSession as RusshSftpSession;

use crate::config::{AuthMethod, ConnectConfig, HostKeyPolicy};
use crate::error::{Error, Result};
use crate::known_hosts::{check_host_key, PresentedKey};
use crate::remote::Dialer;
use crate::sftp::SftpClient;

const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(300);

/// russh 클라이언트 핸들러 (서버 이벤트 처리)
pub struct ClientHandler {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
}

impl client::Handler for ClientHandler {
    type Error = Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        let presented = PresentedKey {
            key_type: server_public_key.algorithm().as_str().to_string(),
            key_b64: BASE64.encode(server_public_key.public_key_bytes()),
        };
        check_host_key(&self.policy, &self.host, self.port, &presented)?;
        Ok(true)
    }
}

pub struct SshDialer {
    config: ConnectConfig,
}

impl SshDialer {
    pub fn new(config: ConnectConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Dialer for SshDialer {
    type Transport = client::Handle<ClientHandler>;
    type Session = SftpClient;

    fn target(&self) -> String {
        self.config.addr()
    }

    async fn dial(&mut self) -> Result<Self::Transport> {
        // ---- TCP 연결 + 핸드셰이크 ----
        let addr = self.config.addr();
        tracing::info!("[session] connecting to {}", addr);

        let russh_config = Arc::new(client::Config {
            inactivity_timeout: Some(INACTIVITY_TIMEOUT),
            ..Default::default()
        });
        let handler = ClientHandler {
            host: self.config.host.clone(),
            port: self.config.port,
            policy: self.config.host_key_policy.clone(),
        };

        let connecting = client::connect(
            russh_config,
            (self.config.host.as_str(), self.config.port),
            handler,
        );
        let mut ssh = tokio::time::timeout(self.config.timeout, connecting)
            .await
            .map_err(|_| Error::Connect {
                addr: addr.clone(),
                reason: format!("timed out after {:?}", self.config.timeout),
            })?
            .map_err(|e| match e {
                Error::Protocol(reason) => Error::Connect { addr: addr.clone(), reason },
                other => other,
            })?;

        // ---- 인증 ----
        let username = &self.config.username;
        let authed = match &self.config.auth {
            AuthMethod::Password(pw) => ssh
                .authenticate_password(username, pw)
                .await
                .map_err(|e| Error::Auth(e.to_string()))?,
            AuthMethod::PublicKey { private_key_path, passphrase } => {
                let key = russh::keys::load_secret_key(private_key_path, passphrase.as_deref())
                    .map_err(|e| {
                        Error::Auth(format!("cannot load key {}: {}", private_key_path.display(), e))
                    })?;
                let key_with_hash = PrivateKeyWithHashAlg::new(Arc::new(key), None);
                ssh.authenticate_publickey(username, key_with_hash)
                    .await
                    .map_err(|e| Error::Auth(e.to_string()))?
            }
        };

        if !authed.success() {
            return Err(Error::Auth(format!("{}@{} rejected by server", username, addr)));
        }

        tracing::info!("[session] authenticated as {}", username);
        Ok(ssh)
    }

    async fn open_session(&mut self, ssh: Self::Transport) -> Result<SftpClient> {
        // ---- 채널 + SFTP ----
        let channel = ssh
            .channel_open_session()
            .await
            .map_err(|e| Error::Protocol(format!("channel open failed: {}", e)))?;

        channel
            .request_subsystem(true, "sftp")
            .await
            .map_err(|e| Error::Protocol(format!("sftp subsystem request failed: {}", e)))?;

        let sftp = RusshSftpSession::new(channel.into_stream())
            .await
            .map_err(|e| Error::Sftp(format!("SFTP client init {} failed: {}", self.config.addr(), e)))?;

        tracing::info!("[session] SFTP ready");
        Ok(SftpClient::new(ssh, sftp))
    }
}
