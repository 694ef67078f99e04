// sftpship Upload Orchestrator
// author: kodeholic
//
// 작업 목록을 순서대로 업로드하고, 성공한 파일만 done 으로 옮긴다.
//
//   Processing → Uploading → Uploaded → Done
//                    │           └─→ Stranded           (done 이동 실패, done 사본 제거, 재업로드 안 함)
//                    └─→ StuckInProcessing               (업로드 실패, 이번 실행에서 재시도 안 함)
//
// 파일 하나의 실패가 배치를 멈추지 않는다. 배치 단위로는 실패하지 않음.
// 리모트 중복 검사 없음: 같은 이름은 덮어쓴다.

use std::path::Path;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;

use crate::config::StageFolders;
use crate::error::{Error, Result};
use crate::fs::LocalFs;
use crate::mover::{discard_destination, move_file};
use crate::remote::RemoteSession;
use crate::state::{RunEvent, RunObserver, Stage, WorkItem};
use crate::utils::remote_join;

pub struct UploadContext<'a> {
    pub fs: &'a dyn LocalFs,
    pub folders: &'a StageFolders,
    pub remote_base: &'a str,
    pub observer: &'a dyn RunObserver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// 업로드 + done 이동 완료
    Delivered { bytes: u64, elapsed: Duration },
    /// processing 에 남음
    UploadFailed { reason: String },
    /// 업로드는 됐지만 processing 에 남음 (재실행 시 리모트 중복 위험)
    Stranded { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub name: String,
    pub outcome: ItemOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    pub fn delivered(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Delivered { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::UploadFailed { .. }))
    }

    pub fn stranded(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Stranded { .. }))
    }

    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }
}

pub async fn upload_batch<S: RemoteSession>(
    session: &mut S,
    items: Vec<WorkItem>,
    ctx: &UploadContext<'_>,
) -> BatchReport {
    let mut report = BatchReport::default();

    for mut item in items {
        let outcome = match process_item(session, &mut item, ctx).await {
            Ok(outcome) => outcome,
            Err(error) => {
                // 상태 전이 위반: 이미 처리된 항목 등, 건드리지 않고 넘어감
                ctx.observer.on_event(&RunEvent::UploadFailed { name: &item.name, error: &error });
                ItemOutcome::UploadFailed { reason: error.to_string() }
            }
        };
        report.items.push(ItemReport { name: item.name, outcome });
    }

    ctx.observer.on_event(&RunEvent::BatchFinished {
        delivered: report.delivered(),
        failed: report.failed(),
        stranded: report.stranded(),
    });
    report
}

/// 업로드/이동 실패는 ItemOutcome 으로, 상태 전이 위반만 Err
async fn process_item<S: RemoteSession>(
    session: &mut S,
    item: &mut WorkItem,
    ctx: &UploadContext<'_>,
) -> Result<ItemOutcome> {
    let local = ctx.folders.processing.join(&item.name);
    let remote = remote_join(ctx.remote_base, &item.name);

    item.transition(Stage::Uploading, ctx.observer)?;

    let started = Instant::now();
    let bytes = match upload_file(session, &local, &remote).await {
        Ok(bytes) => bytes,
        Err(error) => {
            item.transition(Stage::StuckInProcessing, ctx.observer)?;
            ctx.observer.on_event(&RunEvent::UploadFailed { name: &item.name, error: &error });
            return Ok(ItemOutcome::UploadFailed { reason: error.to_string() });
        }
    };
    let elapsed = started.elapsed();

    item.transition(Stage::Uploaded, ctx.observer)?;
    ctx.observer.on_event(&RunEvent::Uploaded { local: &local, remote: &remote, bytes, elapsed });

    let done = ctx.folders.done.join(&item.name);
    match move_file(ctx.fs, &local, &done) {
        Ok(_) => {
            item.transition(Stage::Done, ctx.observer)?;
            Ok(ItemOutcome::Delivered { bytes, elapsed })
        }
        Err(error) => {
            // done 에 남은 사본 제거: stranded 파일은 processing 에만 있어야 함
            if let Err(e) = discard_destination(ctx.fs, &error) {
                ctx.observer.on_event(&RunEvent::DiscardFailed { path: &done, error: &e });
            }
            item.transition(Stage::Stranded, ctx.observer)?;
            ctx.observer.on_event(&RunEvent::Stranded { name: &item.name, error: &error });
            Ok(ItemOutcome::Stranded { reason: error.to_string() })
        }
    }
}

/// 로컬 파일 → 리모트 파일 전체 복사, 전송 바이트 수 반환
async fn upload_file<S: RemoteSession>(session: &mut S, local: &Path, remote: &str) -> Result<u64> {
    let mut file = tokio::fs::File::open(local).await.map_err(|source| Error::LocalOpen {
        path: local.to_path_buf(),
        source,
    })?;

    let mut sink = session.create(remote).await?;

    let transfer_failed = |source| Error::Transfer { path: remote.to_string(), source };
    let bytes = tokio::io::copy(&mut file, &mut sink).await.map_err(transfer_failed)?;
    // shutdown: 리모트 핸들 close 까지 확인
    sink.shutdown().await.map_err(transfer_failed)?;

    Ok(bytes)
}
