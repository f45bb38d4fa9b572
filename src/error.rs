use thiserror::Error;

/// Errors surfaced by the backend client and the driver.
#[derive(Debug, Error)]
pub enum KioskError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned HTTP {0}")]
    Status(u16),

    #[error("malformed backend response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no active session")]
    MissingSession,

    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid intent pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// Voice capture failures. The `Display` text is what the kiosk shows inline.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("이미 녹음이 진행 중입니다.")]
    AlreadyActive,

    #[error("녹음 중이 아닙니다.")]
    NotActive,

    #[error("마이크 권한이 필요합니다.")]
    PermissionDenied,

    #[error("녹음된 음성이 없습니다.")]
    EmptyRecording,

    #[error("녹음 파일을 만들 수 없습니다: {0}")]
    Encode(#[from] hound::Error),
}

impl KioskError {
    /// Transport-class failures are recovered locally with a generic message.
    pub fn is_transport(&self) -> bool {
        matches!(self, KioskError::Transport(_) | KioskError::Status(_))
    }
}
