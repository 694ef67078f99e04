// sftpship Config
// author: kodeholic
//
// JobConfig     : config.json 한 파일 = 실행 1회분 설정 (실행 중 불변)
// ConnectConfig : SSH 접속 정보 (JobConfig 에서 파생)
// StageFolders  : collection / processing / done 로컬 단계 폴더
//
// 키 이름은 기존 config.json 과 호환되도록 PascalCase

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_CONNECT_RETRY: u32 = 3;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobConfig {
    #[serde(default)]
    pub title: String,

    /// "host:port" (port 생략 시 22)
    pub server: String,
    pub user: String,
    #[serde(default)]
    pub password: String,

    /// 지정하면 password 대신 공개키 인증
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_passphrase: Option<String>,

    #[serde(default)]
    pub host_key_policy: HostKeyPolicy,

    pub collection_folder: PathBuf,
    pub processing_folder: PathBuf,
    pub done_folder: PathBuf,
    pub remote_sftp_path: String,

    /// 파일명 부분 문자열 필터 (OR, 대소문자 구분)
    #[serde(default)]
    pub file_name_filter: Vec<String>,

    /// 로그 파일 접두어 → "<LogFile>_YYYYMMDD.txt"
    pub log_file: String,

    /// 최초 시도 이후 추가 재시도 횟수
    #[serde(default = "default_connect_retry")]
    pub connect_retry: u32,

    /// 기존 config.json 호환용으로만 읽음, 재시도는 항상 즉시
    #[serde(default)]
    pub retry_interval: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

fn default_connect_retry() -> u32 {
    DEFAULT_CONNECT_RETRY
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

impl JobConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| Error::ConfigUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| Error::ConfigInvalid {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(raw: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn folders(&self) -> StageFolders {
        StageFolders {
            collection: self.collection_folder.clone(),
            processing: self.processing_folder.clone(),
            done: self.done_folder.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.connect_retry)
    }

    pub fn connect_config(&self) -> Result<ConnectConfig> {
        let (host, port) = parse_server(&self.server)?;
        let auth = match &self.private_key_path {
            Some(path) => AuthMethod::PublicKey {
                private_key_path: path.clone(),
                passphrase: self.private_key_passphrase.clone(),
            },
            None => AuthMethod::Password(self.password.clone()),
        };
        Ok(ConnectConfig {
            host,
            port,
            username: self.user.clone(),
            auth,
            host_key_policy: self.host_key_policy.clone(),
            timeout: Duration::from_secs(self.connect_timeout),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFolders {
    pub collection: PathBuf,
    pub processing: PathBuf,
    pub done: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ConnectConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth: AuthMethod,
    pub host_key_policy: HostKeyPolicy,
    pub timeout: Duration,
}

impl ConnectConfig {
    pub fn addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[derive(Debug, Clone)]
pub enum AuthMethod {
    Password(String),
    PublicKey { private_key_path: PathBuf, passphrase: Option<String> },
}

/// 서버 호스트키 검증 정책
///
/// - AcceptAny   : 검증 생략 (명시적으로 선택해야 함)
/// - Fingerprint : "SHA256:<base64>" 지문 고정
/// - KnownHosts  : OpenSSH known_hosts 파일 (기본 ~/.ssh/known_hosts)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostKeyPolicy {
    AcceptAny,
    Fingerprint { sha256: String },
    KnownHosts {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
}

impl Default for HostKeyPolicy {
    fn default() -> Self {
        HostKeyPolicy::KnownHosts { path: None }
    }
}

/// "host", "host:port", "[v6addr]:port" → (host, port)
pub fn parse_server(server: &str) -> Result<(String, u16)> {
    let server = server.trim();
    let invalid = || Error::InvalidServer(server.to_string());

    if server.is_empty() {
        return Err(invalid());
    }

    if let Some(rest) = server.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
        let port = match tail.strip_prefix(':') {
            Some(p) => p.parse().map_err(|_| invalid())?,
            None if tail.is_empty() => DEFAULT_PORT,
            None => return Err(invalid()),
        };
        return Ok((host.to_string(), port));
    }

    match server.split_once(':') {
        Some((host, port)) if !host.is_empty() => {
            let port = port.parse().map_err(|_| invalid())?;
            Ok((host.to_string(), port))
        }
        Some(_) => Err(invalid()),
        None => Ok((server.to_string(), DEFAULT_PORT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Title": "nightly reports",
        "User": "ship",
        "Password": "secret",
        "Server": "sftp.example.com:2222",
        "CollectionFolder": "/data/out/",
        "FileNameFilter": ["report", "summary"],
        "ProcessingFolder": "/data/processing/",
        "DoneFolder": "/data/done/",
        "RemoteSftpPath": "/inbound/",
        "LogFile": "/var/log/sftpship",
        "ConnectRetry": 5,
        "RetryInterval": 0
    }"#;

    #[test]
    fn parses_legacy_config() {
        let cfg = JobConfig::from_json(SAMPLE).unwrap();
        assert_eq!(cfg.file_name_filter, vec!["report", "summary"]);
        assert_eq!(cfg.retry_policy().max_retries, 5);
        assert_eq!(cfg.host_key_policy, HostKeyPolicy::KnownHosts { path: None });

        let conn = cfg.connect_config().unwrap();
        assert_eq!(conn.host, "sftp.example.com");
        assert_eq!(conn.port, 2222);
        assert!(matches!(conn.auth, AuthMethod::Password(ref p) if p == "secret"));
    }

    #[test]
    fn retry_interval_is_read_but_ignored() {
        let raw = SAMPLE.replace(r#""RetryInterval": 0"#, r#""RetryInterval": 30"#);
        let cfg = JobConfig::from_json(&raw).unwrap();
        assert_eq!(cfg.retry_interval, 30);
        assert_eq!(cfg.retry_policy(), RetryPolicy::new(5));
    }

    #[test]
    fn defaults_apply() {
        let raw = r#"{
            "User": "u", "Server": "h",
            "CollectionFolder": "c", "ProcessingFolder": "p", "DoneFolder": "d",
            "RemoteSftpPath": "", "LogFile": "l"
        }"#;
        let cfg = JobConfig::from_json(raw).unwrap();
        assert_eq!(cfg.connect_retry, DEFAULT_CONNECT_RETRY);
        assert!(cfg.file_name_filter.is_empty());
        assert_eq!(cfg.connect_config().unwrap().port, DEFAULT_PORT);
    }

    #[test]
    fn host_key_policy_variants() {
        let p: HostKeyPolicy =
            serde_json::from_str(r#"{"type":"fingerprint","sha256":"SHA256:abc"}"#).unwrap();
        assert_eq!(p, HostKeyPolicy::Fingerprint { sha256: "SHA256:abc".into() });

        let p: HostKeyPolicy = serde_json::from_str(r#"{"type":"accept_any"}"#).unwrap();
        assert_eq!(p, HostKeyPolicy::AcceptAny);
    }

    #[test]
    fn private_key_selects_pubkey_auth() {
        let mut cfg = JobConfig::from_json(SAMPLE).unwrap();
        cfg.private_key_path = Some(PathBuf::from("/keys/id_ed25519"));
        let conn = cfg.connect_config().unwrap();
        assert!(matches!(conn.auth, AuthMethod::PublicKey { .. }));
    }

    #[test]
    fn server_forms() {
        assert_eq!(parse_server("host").unwrap(), ("host".into(), 22));
        assert_eq!(parse_server("host:2022").unwrap(), ("host".into(), 2022));
        assert_eq!(parse_server("[::1]:2200").unwrap(), ("::1".into(), 2200));
        assert_eq!(parse_server("[::1]").unwrap(), ("::1".into(), 22));
        assert!(parse_server("host:abc").is_err());
        assert!(parse_server(":22").is_err());
        assert!(parse_server("").is_err());
    }

    #[test]
    fn load_reports_path() {
        let err = JobConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, Error::ConfigUnreadable { .. }));
    }
}
