// sftpship Retry Policy
// author: kodeholic
//
// 접속 재시도 정책: 최대 횟수 고정, 시도 사이 대기 없음 (backoff 없음)
// after_failure() 는 "방금 실패한 시도 번호 → 다음 상태" 순수 함수

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 최초 시도 이후 추가 재시도 횟수
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAttempt {
    Retry { attempt: u32 },
    Exhausted { attempts: u32 },
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// attempt: 방금 실패한 시도 번호 (1부터)
    pub fn after_failure(&self, attempt: u32) -> NextAttempt {
        if attempt >= self.max_attempts() {
            NextAttempt::Exhausted { attempts: attempt }
        } else {
            NextAttempt::Retry { attempt: attempt + 1 }
        }
    }
}
