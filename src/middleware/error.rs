
#[derive(Debug, thiserror::Error)]
pub enum MiddlewareError {
    #[error("설정 오류: {0}")]
    Config(String),

    #[error("규칙 {position}의 헤더 '{header}' 패턴 컴파일 실패: {reason}")]
    Compile {
        position: usize,
        header: String,
        reason: String,
    },

    #[error("하이잭을 지원하지 않는 응답 writer입니다")]
    HijackNotSupported,

    #[error("이미 하이잭된 연결입니다")]
    AlreadyHijacked,

    #[error("잘못된 형식: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
