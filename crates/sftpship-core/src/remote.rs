// sftpship Remote Contract
// author: kodeholic
//
// 파이프라인이 프로토콜 클라이언트에 요구하는 최소 기능
//
// Dialer        : dial (TCP + SSH 인증) → open_session (SFTP 서브시스템)
// RemoteSession : 리모트 파일 생성(쓰기 스트림), 세션 종료
//
// 운영: session::SshDialer / sftp::SftpClient (russh 기반)
// 테스트: 메모리 구현으로 실패 주입

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::error::Result;

#[async_trait]
pub trait Dialer: Send {
    type Transport: Send;
    type Session: RemoteSession;

    /// 로그/에러 메시지용 접속 대상 ("host:port")
    fn target(&self) -> String;

    async fn dial(&mut self) -> Result<Self::Transport>;

    async fn open_session(&mut self, transport: Self::Transport) -> Result<Self::Session>;
}

#[async_trait]
pub trait RemoteSession: Send {
    type Writer: AsyncWrite + Unpin + Send;

    /// 리모트 파일 생성 (있으면 덮어씀)
    async fn create(&mut self, path: &str) -> Result<Self::Writer>;

    /// 프로토콜 세션 + 전송 계층 종료
    async fn close(&mut self) -> Result<()>;
}
