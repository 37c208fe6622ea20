use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use regex_lite as regex;
use tracing::warn;

use crate::logging::AppliedRewrite;
use crate::middleware::error::MiddlewareError;
use super::config::{Rewrite, RewriteHeadersConfig};

/// 단일 재작성 규칙
///
/// 생성 시점에 패턴이 컴파일되며, 이후에는 불변입니다.
#[derive(Debug, Clone)]
pub struct Rule {
    header: HeaderName,
    pattern: regex::Regex,
    replacement: String,
}

impl Rule {
    pub fn compile(position: usize, rewrite: &Rewrite) -> Result<Self, MiddlewareError> {
        // HeaderName 파싱이 소문자로 정규화하므로 매칭은 대소문자를 구분하지 않음
        let header = HeaderName::from_bytes(rewrite.header.as_bytes()).map_err(|e| {
            MiddlewareError::Config(format!(
                "규칙 {}의 헤더 이름 '{}'이(가) 유효하지 않습니다: {}",
                position, rewrite.header, e
            ))
        })?;

        let pattern = regex::Regex::new(&rewrite.regex).map_err(|e| MiddlewareError::Compile {
            position,
            header: rewrite.header.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            header,
            pattern,
            replacement: rewrite.replacement.clone(),
        })
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// 값 하나에 규칙을 적용합니다. 매치가 없으면 입력이 그대로 반환됩니다.
    fn rewrite_value(&self, value: &str) -> String {
        self.pattern
            .replace_all(value, self.replacement.as_str())
            .into_owned()
    }
}

/// 순서가 보존되는 불변 규칙 목록
///
/// 한 번 컴파일된 뒤에는 읽기 전용으로만 공유되므로 요청 간 잠금이 필요 없습니다.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// 설정을 컴파일합니다. 빈 목록과 잘못된 규칙은 여기서 실패합니다.
    pub fn compile(config: &RewriteHeadersConfig) -> Result<Self, MiddlewareError> {
        if config.rewrites.is_empty() {
            return Err(MiddlewareError::Config("재작성 규칙이 비어 있습니다".to_string()));
        }

        let rules = config
            .rewrites
            .iter()
            .enumerate()
            .map(|(position, rewrite)| Rule::compile(position, rewrite))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 모든 규칙을 선언 순서대로 헤더 맵에 적용합니다.
    ///
    /// 같은 이름의 값 개수와 순서는 보존되고, 같은 헤더를 겨냥한 뒤 규칙은
    /// 앞 규칙의 출력을 입력으로 받습니다. 응답에 없는 헤더는 건너뜁니다.
    pub fn apply(&self, headers: &mut HeaderMap) -> Vec<AppliedRewrite> {
        let mut applied = Vec::new();

        for rule in &self.rules {
            let values: Vec<HeaderValue> = headers.get_all(&rule.header).iter().cloned().collect();
            if values.is_empty() {
                continue;
            }

            let mut rewritten = Vec::with_capacity(values.len());
            let mut changed = false;

            for value in values {
                let text = match value.to_str() {
                    Ok(text) => text,
                    Err(_) => {
                        // UTF-8이 아닌 값은 건드리지 않음
                        warn!(header = %rule.header, "UTF-8이 아닌 헤더 값은 재작성하지 않습니다");
                        rewritten.push(value);
                        continue;
                    }
                };

                let output = rule.rewrite_value(text);
                if output == text {
                    rewritten.push(value);
                    continue;
                }

                match HeaderValue::from_str(&output) {
                    Ok(new_value) => {
                        applied.push(AppliedRewrite {
                            header: rule.header.to_string(),
                            before: text.to_string(),
                            after: output,
                        });
                        rewritten.push(new_value);
                        changed = true;
                    }
                    Err(e) => {
                        warn!(
                            header = %rule.header,
                            error = %e,
                            "재작성 결과가 유효한 헤더 값이 아니므로 원본을 유지합니다"
                        );
                        rewritten.push(value);
                    }
                }
            }

            if changed {
                headers.remove(&rule.header);
                for value in rewritten {
                    headers.append(rule.header.clone(), value);
                }
            }
        }

        applied
    }
}
