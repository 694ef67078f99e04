// sftpship Host Key Verification
// author: kodeholic
//
// HostKeyPolicy 에 따라 서버 호스트키를 검증
// - AcceptAny   : 항상 통과 (경고 로그)
// - Fingerprint : SHA256 지문 비교
// - KnownHosts  : OpenSSH known_hosts 파일 대조, 모르는 키/바뀐 키 모두 거부
//
// 해시된 호스트명(|1|...)은 지원하지 않음 → 해당 줄은 무시

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha256};

use crate::config::HostKeyPolicy;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKeyVerification {
    Verified,
    Unknown { fingerprint: String },
    Changed { expected: String, actual: String },
}

/// 서버가 제시한 키 (known_hosts 표기 그대로)
#[derive(Debug, Clone)]
pub struct PresentedKey {
    pub key_type: String,
    pub key_b64: String,
}

impl PresentedKey {
    pub fn fingerprint(&self) -> String {
        fingerprint_b64(&self.key_b64)
    }
}

/// "SHA256:<base64, padding 제거>" (ssh-keygen -l 형식)
pub fn fingerprint_bytes(key_bytes: &[u8]) -> String {
    let hash = Sha256::digest(key_bytes);
    format!("SHA256:{}", BASE64.encode(hash).trim_end_matches('='))
}

fn fingerprint_b64(key_b64: &str) -> String {
    match BASE64.decode(key_b64) {
        Ok(bytes) => fingerprint_bytes(&bytes),
        Err(_) => "unknown".to_string(),
    }
}

#[derive(Debug, Clone)]
struct HostKeyEntry {
    key_type: String,
    key_b64: String,
}

#[derive(Debug, Default)]
pub struct KnownHosts {
    hosts: HashMap<String, Vec<HostKeyEntry>>,
}

impl KnownHosts {
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".ssh").join("known_hosts"))
            .unwrap_or_else(|| PathBuf::from(".ssh/known_hosts"))
    }

    /// 파일이 없으면 빈 목록 (모든 호스트가 Unknown)
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("[known_hosts] {} not found", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let mut hosts: HashMap<String, Vec<HostKeyEntry>> = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            // hostname[,alias] keytype base64key [comment]
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 || parts[0].starts_with('@') {
                continue;
            }
            let entry = HostKeyEntry {
                key_type: parts[1].to_string(),
                key_b64: parts[2].to_string(),
            };
            for hostname in parts[0].split(',') {
                if hostname.starts_with('|') {
                    continue;
                }
                hosts.entry(hostname.to_lowercase()).or_default().push(entry.clone());
            }
        }

        Self { hosts }
    }

    /// known_hosts 조회 키: 22번은 "host", 그 외 "[host]:port"
    fn lookup_key(host: &str, port: u16) -> String {
        let host = host.to_lowercase();
        if port == 22 { host } else { format!("[{}]:{}", host, port) }
    }

    pub fn verify(&self, host: &str, port: u16, key: &PresentedKey) -> HostKeyVerification {
        let fingerprint = key.fingerprint();
        let Some(entries) = self.hosts.get(&Self::lookup_key(host, port)) else {
            return HostKeyVerification::Unknown { fingerprint };
        };

        let mut same_type = entries.iter().filter(|e| e.key_type == key.key_type).peekable();
        let Some(first) = same_type.peek().cloned() else {
            // 호스트는 알지만 이 키 타입은 처음
            return HostKeyVerification::Unknown { fingerprint };
        };
        if same_type.any(|e| e.key_b64 == key.key_b64) {
            return HostKeyVerification::Verified;
        }
        HostKeyVerification::Changed {
            expected: fingerprint_b64(&first.key_b64),
            actual: fingerprint,
        }
    }
}

/// 정책 적용 결과: Ok(()) 면 접속 진행
pub fn check_host_key(
    policy: &HostKeyPolicy,
    host: &str,
    port: u16,
    key: &PresentedKey,
) -> Result<()> {
    match policy {
        HostKeyPolicy::AcceptAny => {
            tracing::warn!(
                "[known_hosts] host key verification disabled, accepting {} for {}:{}",
                key.fingerprint(), host, port
            );
            Ok(())
        }
        HostKeyPolicy::Fingerprint { sha256 } => {
            let actual = key.fingerprint();
            let expected = sha256.trim().trim_end_matches('=');
            if actual == expected {
                Ok(())
            } else {
                Err(Error::HostKey(format!(
                    "fingerprint mismatch for {}:{} (expected {}, got {})",
                    host, port, expected, actual
                )))
            }
        }
        HostKeyPolicy::KnownHosts { path } => {
            let path = path.clone().unwrap_or_else(KnownHosts::default_path);
            let known = KnownHosts::load(&path)?;
            match known.verify(host, port, key) {
                HostKeyVerification::Verified => {
                    tracing::info!("[known_hosts] host key verified for {}:{}", host, port);
                    Ok(())
                }
                HostKeyVerification::Unknown { fingerprint } => Err(Error::HostKey(format!(
                    "unknown host {}:{} ({}), add it to {}",
                    host, port, fingerprint, path.display()
                ))),
                HostKeyVerification::Changed { expected, actual } => Err(Error::HostKey(format!(
                    "HOST KEY CHANGED for {}:{} (expected {}, got {})",
                    host, port, expected, actual
                ))),
            }
        }
    }
}
