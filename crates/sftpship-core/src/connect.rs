// sftpship Connection Manager
// author: kodeholic
//
// dial → open_session 두 단계를 한 번의 시도로 보고,
// 어느 단계든 실패하면 처음부터 다시 시도 (RetryPolicy 한도까지, 대기 없이 즉시)

use crate::error::{Error, Result};
use crate::remote::Dialer;
use crate::retry::{NextAttempt, RetryPolicy};
use crate::state::{RunEvent, RunObserver};

pub async fn connect_with_retry<D: Dialer>(
    dialer: &mut D,
    policy: &RetryPolicy,
    observer: &dyn RunObserver,
) -> Result<D::Session> {
    let addr = dialer.target();
    let mut attempt = 1;

    loop {
        match try_connect(dialer).await {
            Ok(session) => {
                observer.on_event(&RunEvent::Connected { addr: &addr, attempts: attempt });
                return Ok(session);
            }
            Err(error) => {
                observer.on_event(&RunEvent::ConnectFailed {
                    addr: &addr,
                    attempt,
                    max_attempts: policy.max_attempts(),
                    error: &error,
                });
                match policy.after_failure(attempt) {
                    NextAttempt::Retry { attempt: next } => attempt = next,
                    NextAttempt::Exhausted { attempts } => {
                        return Err(Error::ConnectionExhausted { addr, attempts });
                    }
                }
            }
        }
    }
}

async fn try_connect<D: Dialer>(dialer: &mut D) -> Result<D::Session> {
    let transport = dialer.dial().await?;
    dialer.open_session(transport).await
}
