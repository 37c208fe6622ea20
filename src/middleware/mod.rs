pub mod error;
pub mod response;
pub mod rewrite_headers;
pub mod traits;

pub use error::MiddlewareError;
pub use response::write_error_response;
pub use rewrite_headers::{HeaderRewriter, Rewrite, RewriteHeaders, RewriteHeadersConfig, Rule, RuleSet};
pub use traits::{Handler, Hijacked, RawStream, ResponseWriter};

/// 미들웨어가 다루는 요청 타입
pub type Request = hyper::Request<http_body_util::Full<bytes::Bytes>>;
