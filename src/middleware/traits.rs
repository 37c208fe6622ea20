use super::{MiddlewareError, Request};
use async_trait::async_trait;
use bytes::Bytes;
use hyper::{HeaderMap, StatusCode};
use tokio::io::{AsyncRead, AsyncWrite};

/// 하이잭으로 넘겨받는 원시 바이트 스트림
pub trait RawStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<S: AsyncRead + AsyncWrite + Send + Unpin> RawStream for S {}

/// 하이잭 결과
///
/// 원시 연결과, 읽혔지만 아직 소비되지 않은 수신 버퍼를 함께 넘깁니다.
pub struct Hijacked {
    pub stream: Box<dyn RawStream>,
    pub read_buf: Bytes,
}

/// 응답 기록 계약
///
/// 헤더 맵 접근, 상태/바디 전송, 선택적 하이잭만을 노출하는 최소 인터페이스를 정의합니다.
#[async_trait]
pub trait ResponseWriter: Send {
    fn headers(&self) -> &HeaderMap;

    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// 상태 줄과 현재 헤더를 전송합니다.
    async fn write_head(&mut self, status: StatusCode) -> Result<(), MiddlewareError>;

    /// 바디 바이트를 전송합니다. 헤더가 아직 전송되지 않았다면 먼저 전송됩니다.
    async fn write_body(&mut self, data: &[u8]) -> Result<(), MiddlewareError>;

    fn supports_hijack(&self) -> bool {
        false
    }

    /// 원시 연결의 소유권을 호출자에게 넘깁니다.
    ///
    /// 이후의 바이트 스트림은 구조화된 응답 쓰기 경로를 거치지 않습니다.
    fn hijack(&mut self) -> Result<Hijacked, MiddlewareError> {
        Err(MiddlewareError::HijackNotSupported)
    }
}

/// 업스트림 핸들러 계약
///
/// (장식된 writer, 요청)으로 호출되어 임의의 헤더/바디 쓰기와 하이잭을 수행할 수 있습니다.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, writer: &mut dyn ResponseWriter, req: Request) -> Result<(), MiddlewareError>;
}
