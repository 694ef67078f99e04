// sftpship Stage Mover
// author: kodeholic
//
// 단계 폴더 간 파일 이동: copy → close → delete
// rename 을 쓰지 않는 이유: 단계 폴더가 서로 다른 볼륨일 수 있음
//
// 재시도 없음. 재시도 여부는 호출자가 결정한다.
// 실패 시 dst 정리는 discard_destination() 으로 호출자가 한다.

use std::io::{self, Write};
use std::path::Path;

use crate::error::MoveError;
use crate::fs::LocalFs;

/// src → dst 이동, 복사한 바이트 수 반환
///
/// 복사가 끝나기 전에는 src 를 절대 지우지 않는다.
pub fn move_file(fs: &dyn LocalFs, src: &Path, dst: &Path) -> Result<u64, MoveError> {
    let bytes = {
        let mut reader = fs.open_read(src).map_err(|source| MoveError::SourceUnreadable {
            path: src.to_path_buf(),
            source,
        })?;

        let mut writer = fs.create_write(dst).map_err(|source| MoveError::DestinationUnwritable {
            path: dst.to_path_buf(),
            source,
        })?;

        let copy_failed = |source| MoveError::CopyFailed {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            source,
        };
        let n = io::copy(&mut reader, &mut writer).map_err(copy_failed)?;
        writer.flush().map_err(copy_failed)?;
        n
        // reader, writer drop → 양쪽 핸들 close
    };

    fs.remove_file(src).map_err(|source| MoveError::SourceDeleteFailed {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        source,
    })?;

    Ok(bytes)
}

/// 실패한 이동이 dst 에 남긴 사본 제거 → src 쪽 한 곳에만 남도록
///
/// dst 를 만들기 전에 실패했으면 할 일 없음
pub fn discard_destination(fs: &dyn LocalFs, error: &MoveError) -> io::Result<()> {
    match error.destination_left() {
        Some(dst) if fs.exists(dst) => fs.remove_file(dst),
        _ => Ok(()),
    }
}
