use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::middleware::error::MiddlewareError;

/// 재작성 규칙 기술자
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rewrite {
    /// 대상 헤더 이름 (대소문자 구분 없음)
    pub header: String,

    /// 정규식 패턴
    pub regex: String,

    /// 치환 템플릿 (`$1`, `${name}` 역참조 사용 가능)
    pub replacement: String,
}

/// 재작성 미들웨어 설정
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RewriteHeadersConfig {
    /// 선언 순서대로 적용되는 규칙 목록
    #[serde(default)]
    pub rewrites: Vec<Rewrite>,
}

impl RewriteHeadersConfig {
    /// TOML 설정에서 파싱합니다.
    pub fn from_toml(config: &str) -> Result<Self, MiddlewareError> {
        toml::from_str(config).map_err(|e| MiddlewareError::InvalidFormat(e.to_string()))
    }

    /// Docker 라벨에서 미들웨어 설정을 파싱합니다.
    ///
    /// `rproxy.http.middlewares.{이름}.rewrite-headers.rewrites.{인덱스}.{필드}` 형식을 사용합니다.
    pub fn from_labels(labels: &HashMap<String, String>, name: &str) -> Result<Self, MiddlewareError> {
        let prefix = format!("rproxy.http.middlewares.{}.rewrite-headers.", name);
        let settings: HashMap<String, String> = labels
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&prefix).map(|rest| (rest.to_string(), value.clone()))
            })
            .collect();

        Self::from_flat_map(&settings)
    }

    /// `rewrites.{인덱스}.{필드}` 형태의 평탄화된 맵에서 파싱합니다.
    ///
    /// 인덱스 순서가 규칙 적용 순서입니다.
    pub fn from_flat_map(settings: &HashMap<String, String>) -> Result<Self, MiddlewareError> {
        let mut indexed: BTreeMap<usize, serde_json::Map<String, serde_json::Value>> = BTreeMap::new();

        for (key, value) in settings {
            let rest = match key.strip_prefix("rewrites.") {
                Some(rest) => rest,
                None => continue,
            };
            let (index, field) = rest.split_once('.').ok_or_else(|| {
                MiddlewareError::InvalidFormat(format!("잘못된 재작성 설정 키: {}", key))
            })?;
            let index: usize = index.parse().map_err(|_| {
                MiddlewareError::InvalidFormat(format!("잘못된 재작성 규칙 인덱스: {}", key))
            })?;

            indexed
                .entry(index)
                .or_default()
                .insert(field.to_string(), serde_json::Value::String(value.clone()));
        }

        let rewrites = indexed
            .into_iter()
            .map(|(index, fields)| {
                serde_json::from_value(serde_json::Value::Object(fields)).map_err(|e| {
                    MiddlewareError::InvalidFormat(format!("재작성 규칙 {} 파싱 실패: {}", index, e))
                })
            })
            .collect::<Result<Vec<Rewrite>, _>>()?;

        Ok(Self { rewrites })
    }
}
