use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Full;
use hyper::StatusCode;
use rewrite_headers::middleware::{
    Handler, MiddlewareError, Request, ResponseWriter, Rewrite, RewriteHeaders,
    RewriteHeadersConfig,
};
use rewrite_headers::writer::ConnectionWriter;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn request(path: &str) -> Request {
    hyper::Request::builder()
        .uri(path)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

#[tokio::test]
async fn test_writes_head_and_body() {
    let (server, mut client) = tokio::io::duplex(4096);
    let mut writer = ConnectionWriter::new(server);

    writer.headers_mut().insert("content-type", "text/plain".parse().unwrap());
    writer.headers_mut().insert("content-length", "5".parse().unwrap());
    writer.write_head(StatusCode::OK).await.unwrap();
    writer.write_body(b"hello").await.unwrap();
    assert!(writer.head_sent());
    drop(writer);

    let mut received = String::new();
    client.read_to_string(&mut received).await.unwrap();

    assert!(received.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(received.contains("content-type: text/plain\r\n"));
    assert!(received.contains("content-length: 5\r\n"));
    assert!(received.ends_with("\r\n\r\nhello"));
}

#[tokio::test]
async fn test_body_write_sends_implicit_ok_head() {
    let (server, mut client) = tokio::io::duplex(4096);
    let mut writer = ConnectionWriter::new(server);

    writer.write_body(b"hi").await.unwrap();
    drop(writer);

    let mut received = String::new();
    client.read_to_string(&mut received).await.unwrap();

    assert!(received.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(received.matches("HTTP/1.1").count(), 1);
}

#[tokio::test]
async fn test_superfluous_write_head_is_ignored() {
    let (server, mut client) = tokio::io::duplex(4096);
    let mut writer = ConnectionWriter::new(server);

    writer.write_head(StatusCode::OK).await.unwrap();
    writer.write_head(StatusCode::NOT_FOUND).await.unwrap();
    drop(writer);

    let mut received = String::new();
    client.read_to_string(&mut received).await.unwrap();

    assert_eq!(received.matches("HTTP/1.1").count(), 1);
    assert!(received.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(!received.contains("404"));
}

#[tokio::test]
async fn test_structured_writes_fail_after_hijack() {
    let (server, _client) = tokio::io::duplex(4096);
    let mut writer = ConnectionWriter::new(server);

    writer.hijack().unwrap();

    assert!(matches!(
        writer.write_head(StatusCode::OK).await,
        Err(MiddlewareError::AlreadyHijacked)
    ));
    assert!(matches!(
        writer.write_body(b"late").await,
        Err(MiddlewareError::AlreadyHijacked)
    ));
    assert!(!writer.head_sent());
}

// 리다이렉트 응답을 쓰는 업스트림
struct RedirectStub;

#[async_trait]
impl Handler for RedirectStub {
    async fn handle(&self, rw: &mut dyn ResponseWriter, _req: Request) -> Result<(), MiddlewareError> {
        rw.headers_mut().insert("location", "http://test:1000".parse().unwrap());
        rw.write_head(StatusCode::MOVED_PERMANENTLY).await?;
        rw.write_body(b"moved").await
    }
}

// 업그레이드를 협상하고 연결을 하이잭하는 업스트림
struct UpgradeStub;

#[async_trait]
impl Handler for UpgradeStub {
    async fn handle(&self, rw: &mut dyn ResponseWriter, _req: Request) -> Result<(), MiddlewareError> {
        // 하이잭 전에 설정된 헤더는 전송되지 않으며 재작성 대상도 아님
        rw.headers_mut().insert("location", "foo".parse().unwrap());
        assert!(rw.supports_hijack());

        let mut hijacked = rw.hijack()?;
        assert!(hijacked.read_buf.is_empty());
        hijacked
            .stream
            .write_all(b"HTTP/1.1 101 Switching Protocols\r\nupgrade: websocket\r\n\r\nfoo frame")
            .await?;
        hijacked.stream.flush().await?;
        Ok(())
    }
}

fn location_config(regex: &str, replacement: &str) -> RewriteHeadersConfig {
    RewriteHeadersConfig {
        rewrites: vec![Rewrite {
            header: "Location".to_string(),
            regex: regex.to_string(),
            replacement: replacement.to_string(),
        }],
    }
}

#[tokio::test]
async fn test_rewrite_reaches_the_wire() {
    let (server, mut client) = tokio::io::duplex(4096);
    let mut writer = ConnectionWriter::new(server);

    let middleware = RewriteHeaders::new(
        Box::new(RedirectStub),
        location_config("^http://(.+)$", "https://$1"),
        "rewrite-location",
    )
    .unwrap();

    middleware.handle(&mut writer, request("/")).await.unwrap();
    drop(writer);

    let mut received = String::new();
    client.read_to_string(&mut received).await.unwrap();

    assert!(received.starts_with("HTTP/1.1 301 Moved Permanently\r\n"));
    assert!(received.contains("location: https://test:1000\r\n"));
    assert!(!received.contains("http://test:1000"));
    assert!(received.ends_with("moved"));
}

#[tokio::test]
async fn test_upgrade_flow_bypasses_rewriting() {
    let (server, mut client) = tokio::io::duplex(4096);
    let mut writer = ConnectionWriter::new(server);

    let middleware = RewriteHeaders::new(
        Box::new(UpgradeStub),
        location_config("foo", "bar"),
        "rewrite-ws",
    )
    .unwrap();

    middleware.handle(&mut writer, request("/ws")).await.unwrap();

    let mut received = String::new();
    client.read_to_string(&mut received).await.unwrap();

    // 하이잭으로 넘어간 원시 스트림은 규칙의 영향을 받지 않음
    assert!(received.starts_with("HTTP/1.1 101 Switching Protocols\r\n"));
    assert!(received.contains("foo frame"));
    assert!(!received.contains("bar"));
}
