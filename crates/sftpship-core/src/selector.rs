// sftpship File Selector
// author: kodeholic
//
// collection 폴더에서 필터에 맞는 파일을 골라 processing 으로 옮기고
// 이번 실행의 작업 목록(WorkItem)을 만든다.
//
// - 디렉토리는 무조건 제외
// - 필터: 파일명 부분 문자열, OR, 대소문자 구분 (빈 필터 목록 → 선택 없음)
// - 이동 실패 파일은 목록에서 빠지고 collection 에 남음 (다음 실행 대상)
//   processing 에 남은 사본은 지운다
// - 같은 이름이 processing/done 에 이미 있으면 건드리지 않고 보고만 함

use std::path::Path;

use crate::config::StageFolders;
use crate::error::{Error, Result};
use crate::fs::LocalFs;
use crate::mover::{discard_destination, move_file};
use crate::state::{RunEvent, RunObserver, Stage, WorkItem};

/// 파일명이 필터 중 하나라도 포함하는지 ("" 는 모든 이름에 걸림)
pub fn matches_filter(name: &str, filters: &[String]) -> bool {
    filters.iter().any(|f| name.contains(f.as_str()))
}

/// 이전 실행이 processing 에 남긴 파일 목록 (업로드 실패/stranded)
///
/// 보고만 하고 업로드·이동은 하지 않는다. 목록 조회 실패도 보고 대상이 아님.
pub fn audit_processing(
    fs: &dyn LocalFs,
    folders: &StageFolders,
    observer: &dyn RunObserver,
) -> Vec<String> {
    let Ok(entries) = fs.read_dir(&folders.processing) else {
        return Vec::new();
    };
    let mut files: Vec<_> = entries.into_iter().filter(|e| !e.is_dir).collect();
    files.sort_by(|a, b| a.name.cmp(&b.name));
    for file in &files {
        observer.on_event(&RunEvent::Leftover { name: &file.name, size: file.size });
    }
    files.into_iter().map(|e| e.name).collect()
}

/// collection → processing 스테이징, 성공한 파일만 이름순으로 반환
pub fn select(
    fs: &dyn LocalFs,
    folders: &StageFolders,
    filters: &[String],
    observer: &dyn RunObserver,
) -> Result<Vec<WorkItem>> {
    let mut entries = fs
        .read_dir(&folders.collection)
        .map_err(|source| Error::CollectionUnreadable {
            path: folders.collection.clone(),
            source,
        })?;
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let mut staged = Vec::new();
    for entry in entries {
        if entry.is_dir || !matches_filter(&entry.name, filters) {
            continue;
        }

        if let Some(folder) = collision(fs, folders, &entry.name) {
            observer.on_event(&RunEvent::StageCollision { name: &entry.name, folder });
            continue;
        }

        let src = folders.collection.join(&entry.name);
        let dst = folders.processing.join(&entry.name);
        match move_file(fs, &src, &dst) {
            Ok(bytes) => {
                observer.on_event(&RunEvent::Moved { src: &src, dst: &dst, bytes });
                let mut item = WorkItem::collected(entry.name);
                item.transition(Stage::Processing, observer)?;
                staged.push(item);
            }
            Err(error) => {
                observer.on_event(&RunEvent::MoveFailed { error: &error });
                if let Err(e) = discard_destination(fs, &error) {
                    observer.on_event(&RunEvent::DiscardFailed { path: &dst, error: &e });
                }
            }
        }
    }

    Ok(staged)
}

fn collision<'a>(fs: &dyn LocalFs, folders: &'a StageFolders, name: &str) -> Option<&'a Path> {
    [folders.processing.as_path(), folders.done.as_path()]
        .into_iter()
        .find(|folder| fs.exists(&folder.join(name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::OsFs;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::{tempdir, TempDir};

    #[derive(Default)]
    struct Log(Mutex<Vec<String>>);

    impl RunObserver for Log {
        fn on_event(&self, event: &RunEvent<'_>) {
            let line = match event {
                RunEvent::Leftover { name, size } => format!("leftover {} {}", name, size),
                RunEvent::StageCollision { name, .. } => format!("collision {}", name),
                RunEvent::MoveFailed { .. } => "move failed".to_string(),
                _ => return,
            };
            self.0.lock().unwrap().push(line);
        }
    }

    fn folders() -> (TempDir, StageFolders) {
        let dir = tempdir().unwrap();
        let folders = StageFolders {
            collection: dir.path().join("collection"),
            processing: dir.path().join("processing"),
            done: dir.path().join("done"),
        };
        for d in [&folders.collection, &folders.processing, &folders.done] {
            fs::create_dir(d).unwrap();
        }
        (dir, folders)
    }

    fn filters(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn filter_semantics() {
        let f = filters(&["report", "sum"]);
        assert!(matches_filter("report_20240101.csv", &f));
        assert!(matches_filter("daily_summary.txt", &f));
        assert!(!matches_filter("Report.csv", &f));
        assert!(!matches_filter("notes.txt", &f));
        assert!(!matches_filter("report.csv", &[]));
        assert!(matches_filter("notes.txt", &filters(&[""])));
    }

    #[test]
    fn stages_only_matching_files() {
        let (_dir, folders) = folders();
        fs::write(folders.collection.join("report_b.csv"), b"b").unwrap();
        fs::write(folders.collection.join("report_a.csv"), b"a").unwrap();
        fs::write(folders.collection.join("notes.txt"), b"n").unwrap();
        fs::create_dir(folders.collection.join("report_dir")).unwrap();

        let items = select(&OsFs, &folders, &filters(&["report"]), &Log::default()).unwrap();

        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["report_a.csv", "report_b.csv"]);
        assert!(items.iter().all(|i| i.stage() == Stage::Processing));

        assert!(folders.processing.join("report_a.csv").exists());
        assert!(!folders.collection.join("report_a.csv").exists());
        assert!(folders.collection.join("notes.txt").exists());
        assert!(folders.collection.join("report_dir").is_dir());
    }

    #[test]
    fn empty_string_filter_selects_everything() {
        let (_dir, folders) = folders();
        fs::write(folders.collection.join("notes.txt"), b"n").unwrap();
        fs::write(folders.collection.join("report.csv"), b"r").unwrap();

        let items = select(&OsFs, &folders, &filters(&[""]), &Log::default()).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn empty_filter_set_selects_nothing() {
        let (_dir, folders) = folders();
        fs::write(folders.collection.join("report.csv"), b"r").unwrap();

        let items = select(&OsFs, &folders, &[], &Log::default()).unwrap();
        assert!(items.is_empty());
        assert!(folders.collection.join("report.csv").exists());
    }

    #[test]
    fn failed_stage_move_is_dropped() {
        let (_dir, folders) = folders();
        fs::write(folders.collection.join("report.csv"), b"r").unwrap();
        fs::remove_dir(&folders.processing).unwrap();

        let log = Log::default();
        let items = select(&OsFs, &folders, &filters(&["report"]), &log).unwrap();

        assert!(items.is_empty());
        assert!(folders.collection.join("report.csv").exists());
        assert_eq!(*log.0.lock().unwrap(), vec!["move failed"]);
    }

    #[test]
    fn unreadable_collection_is_fatal() {
        let (_dir, mut folders) = folders();
        folders.collection = folders.collection.join("missing");

        let err = select(&OsFs, &folders, &filters(&["x"]), &Log::default()).unwrap_err();
        assert!(matches!(err, Error::CollectionUnreadable { .. }));
    }

    #[test]
    fn collision_is_reported_not_resolved() {
        let (_dir, folders) = folders();
        fs::write(folders.collection.join("report.csv"), b"new").unwrap();
        fs::write(folders.done.join("report.csv"), b"old").unwrap();

        let log = Log::default();
        let items = select(&OsFs, &folders, &filters(&["report"]), &log).unwrap();

        assert!(items.is_empty());
        assert_eq!(fs::read(folders.collection.join("report.csv")).unwrap(), b"new");
        assert_eq!(fs::read(folders.done.join("report.csv")).unwrap(), b"old");
        assert_eq!(*log.0.lock().unwrap(), vec!["collision report.csv"]);
    }

    #[test]
    fn audit_lists_leftovers() {
        let (_dir, folders) = folders();
        fs::write(folders.processing.join("stuck.csv"), b"s").unwrap();

        let log = Log::default();
        let leftovers = audit_processing(&OsFs, &folders, &log);

        assert_eq!(leftovers, vec!["stuck.csv"]);
        assert_eq!(*log.0.lock().unwrap(), vec!["leftover stuck.csv 1"]);
        assert!(folders.processing.join("stuck.csv").exists());
    }
}
