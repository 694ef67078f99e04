// sftpship Utils
// author: kodeholic
//
// - remote_join : 리모트 기준 경로 + 파일명 → 리모트 경로
// - fmt_size    : 바이트 → 사람이 읽기 좋은 단위 (1.2MB 등)

/// 리모트 기준 경로 + 파일명 (구분자 보정 없이 그대로 이어붙임)
///
/// 기존 설정 호환: RemoteSftpPath 는 "/upload/" 처럼 '/' 로 끝나게 쓰거나
/// "/upload/batch_" 처럼 파일명 접두어로 쓸 수 있다.
pub fn remote_join(base: &str, name: &str) -> String {
    format!("{}{}", base, name)
}

/// 바이트 → 사람이 읽기 좋은 단위 문자열
pub fn fmt_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB      { format!("{:.1}GB", bytes as f64 / GB as f64) }
    else if bytes >= MB { format!("{:.1}MB", bytes as f64 / MB as f64) }
    else if bytes >= KB { format!("{:.1}KB", bytes as f64 / KB as f64) }
    else                { format!("{}B",     bytes) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_concatenates_as_is() {
        assert_eq!(remote_join("", "a.csv"), "a.csv");
        assert_eq!(remote_join("/upload/", "a.csv"), "/upload/a.csv");
        assert_eq!(remote_join("/", "a.csv"), "/a.csv");
        // 접두어 형태
        assert_eq!(remote_join("/in/batch_", "a.csv"), "/in/batch_a.csv");
    }

    #[test]
    fn size_units() {
        assert_eq!(fmt_size(512), "512B");
        assert_eq!(fmt_size(1536), "1.5KB");
        assert_eq!(fmt_size(3 * 1024 * 1024), "3.0MB");
    }
}
