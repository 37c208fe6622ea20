//! 응답 헤더를 정규식 규칙으로 재작성하는 HTTP 미들웨어입니다.
//!
//! # 주요 기능
//!
//! - 선언 순서대로 적용되는 불변 규칙 목록
//! - 헤더 플러시 시점에 정확히 한 번 적용되는 응답 writer 장식자
//! - 프로토콜 업그레이드(웹소켓 등)를 위한 하이잭 투명 전달
//!
//! # 예제
//!
//! ```
//! use rewrite_headers::middleware::{Rewrite, RewriteHeadersConfig, RuleSet};
//!
//! let config = RewriteHeadersConfig {
//!     rewrites: vec![Rewrite {
//!         header: "Location".to_string(),
//!         regex: "^http://(.+)$".to_string(),
//!         replacement: "https://$1".to_string(),
//!     }],
//! };
//!
//! let rules = RuleSet::compile(&config).unwrap();
//!
//! let mut headers = hyper::HeaderMap::new();
//! headers.insert("location", "http://test:1000".parse().unwrap());
//! rules.apply(&mut headers);
//!
//! assert_eq!(headers["location"], "https://test:1000");
//! ```
//!
//! # 설정
//!
//! TOML 또는 Docker 라벨에서 규칙 목록을 읽을 수 있습니다.
//!
//! ```
//! use rewrite_headers::middleware::RewriteHeadersConfig;
//!
//! let config = RewriteHeadersConfig::from_toml(r#"
//!     [[rewrites]]
//!     header = "Location"
//!     regex = "foo"
//!     replacement = "bar"
//! "#).unwrap();
//!
//! assert_eq!(config.rewrites.len(), 1);
//! ```

pub mod logging;
pub mod middleware;
pub mod writer;
