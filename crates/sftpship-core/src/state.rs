// sftpship Stage State Machine + Observer
// author: kodeholic
//
// 파일 하나(WorkItem)의 라이프사이클을 상태 머신으로 관리
// can_transition_to()로 허용된 전이만 가능하게 강제
//
// 상태 흐름:
//   Collected → Processing → Uploading → Uploaded → Done
//                                │            └──→ Stranded          (업로드 O, done 이동 X)
//                                └──→ StuckInProcessing               (업로드 X)

use std::io;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, MoveError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Collected,
    Processing,
    Uploading,
    Uploaded,
    Done,
    StuckInProcessing,
    Stranded,
}

impl Stage {
    /// 허용된 다음 상태인지 검증
    pub fn can_transition_to(&self, next: &Stage) -> bool {
        use Stage::*;
        matches!(
            (self, next),
            (Collected, Processing)
            | (Processing, Uploading)
            | (Uploading, Uploaded)
            | (Uploading, StuckInProcessing)
            | (Uploaded, Done)
            | (Uploaded, Stranded)
        )
    }
}

/// 이번 실행의 작업 단위: 파일명 + 현재 단계
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub name: String,
    stage: Stage,
}

impl WorkItem {
    pub fn collected(name: impl Into<String>) -> Self {
        Self { name: name.into(), stage: Stage::Collected }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn transition(&mut self, next: Stage, observer: &dyn RunObserver) -> Result<()> {
        if !self.stage.can_transition_to(&next) {
            return Err(Error::InvalidTransition {
                name: self.name.clone(),
                from: self.stage,
                to: next,
            });
        }
        let prev = std::mem::replace(&mut self.stage, next);
        observer.on_stage_changed(&self.name, prev, next);
        Ok(())
    }
}

/// 실행 중 발생하는 관찰 가능한 사건
///
/// 운영자가 보는 로그 한 줄에 대응. 기계 판독용 상태는 아님.
#[derive(Debug)]
pub enum RunEvent<'a> {
    /// 이전 실행에서 processing 에 남겨진 파일
    Leftover { name: &'a str, size: u64 },
    /// 같은 이름이 다른 단계 폴더에 이미 존재 → 스테이징 보류
    StageCollision { name: &'a str, folder: &'a Path },
    Moved { src: &'a Path, dst: &'a Path, bytes: u64 },
    MoveFailed { error: &'a MoveError },
    /// 실패한 이동이 남긴 사본을 지우지 못함 → 두 폴더에 같은 파일
    DiscardFailed { path: &'a Path, error: &'a io::Error },
    NoFiles,
    ConnectFailed { addr: &'a str, attempt: u32, max_attempts: u32, error: &'a Error },
    Connected { addr: &'a str, attempts: u32 },
    Uploaded { local: &'a Path, remote: &'a str, bytes: u64, elapsed: Duration },
    UploadFailed { name: &'a str, error: &'a Error },
    Stranded { name: &'a str, error: &'a MoveError },
    SessionCloseFailed { error: &'a Error },
    BatchFinished { delivered: usize, failed: usize, stranded: usize },
}

/// 실행 이벤트 알림 trait
///
/// CLI: tracing 으로 로그 파일에 기록
/// 테스트: 이벤트를 수집해서 검증
pub trait RunObserver: Send + Sync {
    fn on_stage_changed(&self, _name: &str, _prev: Stage, _next: Stage) {}
    fn on_event(&self, event: &RunEvent<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Transitions(Mutex<Vec<(String, Stage, Stage)>>);

    impl RunObserver for Transitions {
        fn on_stage_changed(&self, name: &str, prev: Stage, next: Stage) {
            self.0.lock().unwrap().push((name.to_string(), prev, next));
        }
        fn on_event(&self, _event: &RunEvent<'_>) {}
    }

    #[test]
    fn happy_path_reaches_done() {
        let obs = Transitions::default();
        let mut item = WorkItem::collected("a.csv");
        for next in [Stage::Processing, Stage::Uploading, Stage::Uploaded, Stage::Done] {
            item.transition(next, &obs).unwrap();
        }
        assert_eq!(item.stage(), Stage::Done);
        assert_eq!(obs.0.lock().unwrap().len(), 4);
    }

    #[test]
    fn cannot_skip_upload() {
        let obs = Transitions::default();
        let mut item = WorkItem::collected("a.csv");
        item.transition(Stage::Processing, &obs).unwrap();

        let err = item.transition(Stage::Done, &obs).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition { from: Stage::Processing, to: Stage::Done, .. }
        ));
        assert_eq!(item.stage(), Stage::Processing);
    }

    #[test]
    fn failure_states_are_terminal() {
        assert!(Stage::Uploading.can_transition_to(&Stage::StuckInProcessing));
        assert!(Stage::Uploaded.can_transition_to(&Stage::Stranded));
        assert!(!Stage::StuckInProcessing.can_transition_to(&Stage::Uploading));
        assert!(!Stage::Stranded.can_transition_to(&Stage::Done));
        assert!(!Stage::Processing.can_transition_to(&Stage::Stranded));
    }
}
