// sftpship Job Runner
// author: kodeholic
//
// 실행 1회: audit → select → connect → upload → close
//
// Err 로 끝나는 경우 (실행 중단):
//   - collection 폴더 목록 조회 실패
//   - 접속 재시도 소진
// 작업 목록이 비어 있으면 접속하지 않는다.
// 세션을 얻은 뒤에는 업로드 결과와 무관하게 반드시 close() 한다.

use crate::config::JobConfig;
use crate::connect::connect_with_retry;
use crate::error::Result;
use crate::fs::LocalFs;
use crate::remote::{Dialer, RemoteSession};
use crate::selector::{audit_processing, select};
use crate::state::{RunEvent, RunObserver};
use crate::upload::{upload_batch, BatchReport, UploadContext};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// 실행 시작 시 processing 에 남아있던 파일
    pub leftovers: Vec<String>,
    /// 이번 실행에서 processing 으로 옮긴 파일 수
    pub staged: usize,
    /// 업로드 결과, 작업이 없어 접속하지 않았으면 None
    pub batch: Option<BatchReport>,
}

pub async fn run<D: Dialer>(
    config: &JobConfig,
    fs: &dyn LocalFs,
    dialer: &mut D,
    observer: &dyn RunObserver,
) -> Result<RunSummary> {
    let folders = config.folders();

    let leftovers = audit_processing(fs, &folders, observer);
    let items = select(fs, &folders, &config.file_name_filter, observer)?;
    let staged = items.len();

    if items.is_empty() {
        observer.on_event(&RunEvent::NoFiles);
        return Ok(RunSummary { leftovers, staged, batch: None });
    }

    let mut session = connect_with_retry(dialer, &config.retry_policy(), observer).await?;

    let ctx = UploadContext {
        fs,
        folders: &folders,
        remote_base: &config.remote_sftp_path,
        observer,
    };
    let batch = upload_batch(&mut session, items, &ctx).await;

    if let Err(error) = session.close().await {
        observer.on_event(&RunEvent::SessionCloseFailed { error: &error });
    }

    Ok(RunSummary { leftovers, staged, batch: Some(batch) })
}
