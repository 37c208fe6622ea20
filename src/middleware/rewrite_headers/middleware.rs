use std::sync::Arc;

use async_trait::async_trait;
use hyper::{HeaderMap, StatusCode};
use tracing::debug;
use uuid::Uuid;

use crate::logging::{log_rewrites, RewriteLog};
use crate::middleware::{Handler, Hijacked, MiddlewareError, Request, ResponseWriter};
use super::config::RewriteHeadersConfig;
use super::rule::RuleSet;

/// 응답 writer를 장식해 헤더 플러시 시점에 규칙을 적용하는 래퍼
///
/// 요청마다 하나씩 생성됩니다. 규칙 적용은 첫 헤더 전송(명시적 write_head 또는
/// 첫 바디 쓰기) 직전에 최대 한 번만 일어나며, 하이잭된 연결에는 관여하지 않습니다.
pub struct HeaderRewriter<'w, 'r> {
    inner: &'w mut dyn ResponseWriter,
    rules: &'r RuleSet,
    head_sent: bool,
    log: RewriteLog,
}

impl<'w, 'r> HeaderRewriter<'w, 'r> {
    pub fn new(inner: &'w mut dyn ResponseWriter, rules: &'r RuleSet, log: RewriteLog) -> Self {
        Self {
            inner,
            rules,
            head_sent: false,
            log,
        }
    }

    /// 규칙을 적용하고 래치를 잠급니다. 두 번째 호출부터는 아무것도 하지 않습니다.
    fn flush_rules(&mut self) {
        if self.head_sent {
            return;
        }
        self.head_sent = true;

        let applied = self.rules.apply(self.inner.headers_mut());
        self.log.record(applied);
        log_rewrites(&self.log);
    }
}

#[async_trait]
impl ResponseWriter for HeaderRewriter<'_, '_> {
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    async fn write_head(&mut self, status: StatusCode) -> Result<(), MiddlewareError> {
        self.flush_rules();
        self.inner.write_head(status).await
    }

    async fn write_body(&mut self, data: &[u8]) -> Result<(), MiddlewareError> {
        self.flush_rules();
        self.inner.write_body(data).await
    }

    fn supports_hijack(&self) -> bool {
        self.inner.supports_hijack()
    }

    fn hijack(&mut self) -> Result<Hijacked, MiddlewareError> {
        // 하이잭 이후의 원시 바이트 스트림은 재작성 대상이 아님
        self.inner.hijack()
    }
}

/// 미들웨어 진입점
///
/// 업스트림 핸들러와 규칙 설정으로 생성되며, 요청마다 새 [`HeaderRewriter`]를
/// 실제 writer 앞에 끼워 넣어 업스트림을 호출합니다.
pub struct RewriteHeaders {
    name: String,
    next: Box<dyn Handler>,
    rules: Arc<RuleSet>,
}

impl RewriteHeaders {
    /// 설정을 컴파일해 미들웨어를 생성합니다.
    ///
    /// 빈 규칙 목록과 컴파일되지 않는 패턴은 요청을 받기 전에 여기서 실패합니다.
    pub fn new(
        next: Box<dyn Handler>,
        config: RewriteHeadersConfig,
        name: impl Into<String>,
    ) -> Result<Self, MiddlewareError> {
        let rules = RuleSet::compile(&config)?;
        let name = name.into();
        debug!(middleware = %name, rules = rules.len(), "재작성 미들웨어 생성");

        Ok(Self {
            name,
            next,
            rules: Arc::new(rules),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

#[async_trait]
impl Handler for RewriteHeaders {
    async fn handle(&self, writer: &mut dyn ResponseWriter, req: Request) -> Result<(), MiddlewareError> {
        let request_id = Uuid::new_v4().to_string();
        let mut log = RewriteLog::new(request_id);
        log.with_request(&req);

        let mut rewriter = HeaderRewriter::new(writer, &self.rules, log);
        self.next.handle(&mut rewriter, req).await
    }
}
