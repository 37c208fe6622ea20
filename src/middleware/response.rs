use hyper::StatusCode;
use super::{MiddlewareError, ResponseWriter};

/// 미들웨어 에러를 HTTP 응답으로 변환해 writer에 기록합니다.
pub async fn write_error_response(
    writer: &mut dyn ResponseWriter,
    err: &MiddlewareError,
) -> Result<(), MiddlewareError> {
    let status = match err {
        MiddlewareError::Config(_) | MiddlewareError::Compile { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        MiddlewareError::HijackNotSupported | MiddlewareError::AlreadyHijacked => StatusCode::INTERNAL_SERVER_ERROR,
        MiddlewareError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
        MiddlewareError::Io(_) => StatusCode::BAD_GATEWAY,
    };

    writer.write_head(status).await?;
    writer.write_body(err.to_string().as_bytes()).await
}
