// sftpship Local Filesystem
// author: kodeholic
//
// LocalFs : 단계 이동/선별에 필요한 최소 파일시스템 기능
// OsFs    : std::fs 구현 (운영용)
//
// 테스트에서는 LocalFs 를 감싸 특정 지점에 실패를 주입한다.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// 디렉토리 엔트리 (이름 + 디렉토리 여부)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

pub trait LocalFs: Send + Sync {
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<LocalEntry>>;
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;
    fn create_write(&self, path: &Path) -> io::Result<Box<dyn Write + '_>>;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn exists(&self, path: &Path) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl LocalFs for OsFs {
    /// 엔트리 순서는 플랫폼 의존 (정렬은 호출자 몫)
    ///
    /// 개별 엔트리의 메타데이터 조회 실패, UTF-8 이 아닌 이름은 건너뜀
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<LocalEntry>> {
        let mut entries = Vec::new();
        for res in fs::read_dir(dir)? {
            let Ok(entry) = res else { continue };
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::warn!("[fs] skipping non UTF-8 name {:?} in {}", raw, dir.display());
                    continue;
                }
            };
            // DirEntry::metadata 는 심볼릭 링크를 따라가지 않음
            let Ok(meta) = entry.metadata() else { continue };
            entries.push(LocalEntry { name, is_dir: meta.is_dir(), size: meta.len() });
        }
        Ok(entries)
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(fs::File::open(path)?))
    }

    fn create_write(&self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
        Ok(Box::new(fs::File::create(path)?))
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn read_dir_reports_dirs_and_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"abc").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let mut entries = OsFs.read_dir(dir.path()).unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(
            entries,
            vec![
                LocalEntry { name: "a.txt".into(), is_dir: false, size: 3 },
                LocalEntry { name: "sub".into(), is_dir: true, size: entries[1].size },
            ]
        );
    }

    #[test]
    fn read_dir_missing_is_error() {
        let dir = tempdir().unwrap();
        assert!(OsFs.read_dir(&dir.path().join("nope")).is_err());
    }
}
