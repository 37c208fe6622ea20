use async_trait::async_trait;
use bytes::Bytes;
use hyper::{HeaderMap, StatusCode};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::middleware::{Hijacked, MiddlewareError, RawStream, ResponseWriter};

/// 원시 바이트 스트림 위에서 동작하는 HTTP/1.1 응답 writer
///
/// 상태 줄과 헤더를 직접 인코딩하고, 프로토콜 업그레이드를 위한 하이잭을
/// 지원합니다. 바디 프레이밍(Content-Length, chunked 등)은 호출자가 설정한
/// 헤더를 그대로 따릅니다.
pub struct ConnectionWriter<S> {
    stream: Option<S>,
    headers: HeaderMap,
    head_sent: bool,
}

impl<S: RawStream + 'static> ConnectionWriter<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream: Some(stream),
            headers: HeaderMap::new(),
            head_sent: false,
        }
    }

    pub fn head_sent(&self) -> bool {
        self.head_sent
    }

    fn stream_mut(&mut self) -> Result<&mut S, MiddlewareError> {
        self.stream.as_mut().ok_or(MiddlewareError::AlreadyHijacked)
    }

    /// 상태 줄과 현재 헤더를 와이어 형식으로 인코딩합니다.
    ///
    /// 같은 이름의 헤더는 값마다 한 줄씩, 추가된 순서대로 기록됩니다.
    fn encode_head(&self, status: StatusCode) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {}\r\n", status).into_bytes();
        for (name, value) in self.headers.iter() {
            head.extend_from_slice(name.as_str().as_bytes());
            head.extend_from_slice(b": ");
            head.extend_from_slice(value.as_bytes());
            head.extend_from_slice(b"\r\n");
        }
        head.extend_from_slice(b"\r\n");
        head
    }
}

#[async_trait]
impl<S: RawStream + 'static> ResponseWriter for ConnectionWriter<S> {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    async fn write_head(&mut self, status: StatusCode) -> Result<(), MiddlewareError> {
        if self.head_sent {
            warn!(status = %status, "헤더가 이미 전송된 뒤의 write_head 호출을 무시합니다");
            return Ok(());
        }
        if self.stream.is_none() {
            return Err(MiddlewareError::AlreadyHijacked);
        }

        self.head_sent = true;
        let head = self.encode_head(status);
        let stream = self.stream_mut()?;
        stream.write_all(&head).await?;
        stream.flush().await?;
        Ok(())
    }

    async fn write_body(&mut self, data: &[u8]) -> Result<(), MiddlewareError> {
        if !self.head_sent {
            self.write_head(StatusCode::OK).await?;
        }

        let stream = self.stream_mut()?;
        stream.write_all(data).await?;
        stream.flush().await?;
        Ok(())
    }

    fn supports_hijack(&self) -> bool {
        true
    }

    fn hijack(&mut self) -> Result<Hijacked, MiddlewareError> {
        let stream = self.stream.take().ok_or(MiddlewareError::AlreadyHijacked)?;
        Ok(Hijacked {
            stream: Box::new(stream),
            // 이 writer는 수신 측을 미리 읽지 않으므로 남은 버퍼가 없음
            read_buf: Bytes::new(),
        })
    }
}
