use tracing::{debug, info, Level, span};
use tracing_subscriber::EnvFilter;

pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive(Level::INFO.into())
            .add_directive("rewrite_headers=debug".parse().unwrap()))
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

/// 헤더 값 하나에 적용된 재작성 내역
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedRewrite {
    pub header: String,
    pub before: String,
    pub after: String,
}

/// 요청 한 건에 대한 재작성 로그
#[derive(Debug)]
pub struct RewriteLog {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub applied: Vec<AppliedRewrite>,
}

impl RewriteLog {
    pub fn new(request_id: String) -> Self {
        debug!(request_id = %request_id, "Creating new rewrite log");
        Self {
            request_id,
            method: String::new(),
            path: String::new(),
            applied: Vec::new(),
        }
    }

    pub fn with_request<B>(&mut self, req: &hyper::Request<B>) {
        self.method = req.method().to_string();
        self.path = req.uri().path().to_string();
    }

    pub fn record(&mut self, rewrites: Vec<AppliedRewrite>) {
        for rewrite in &rewrites {
            debug!(
                request_id = %self.request_id,
                header = %rewrite.header,
                before = %rewrite.before,
                after = %rewrite.after,
                "Header value rewritten"
            );
        }
        self.applied.extend(rewrites);
    }
}

/// 플러시 시점에 요청 단위 요약을 남깁니다.
pub fn log_rewrites(log: &RewriteLog) {
    let span = span!(
        Level::DEBUG,
        "rewrite",
        request_id = %log.request_id,
        method = %log.method,
        path = %log.path
    );
    let _enter = span.enter();

    if log.applied.is_empty() {
        debug!("No response headers matched the rule set");
    } else {
        info!(rewritten = log.applied.len(), "Response headers rewritten");
    }
}
