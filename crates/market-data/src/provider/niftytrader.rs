//! NiftyTrader REST 클라이언트.
//!
//! FII/DII 매매 동향과 IPO 목록을 조회합니다. 응답 본문은
//! 가공 없이 그대로 캐시에 저장됩니다.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::{FlowPeriod, FlowsProvider};
use crate::error::{DataError, Result};

/// NiftyTrader API 클라이언트.
pub struct NiftyTraderClient {
    client: reqwest::Client,
    base_url: String,
}

impl NiftyTraderClient {
    /// 새로운 클라이언트 생성.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::ConnectionError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: super::normalize_base_url(&base_url.into())?,
        })
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "NiftyTrader API 호출");

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(DataError::FetchError(format!("{} 응답 코드 {}", path, status)));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl FlowsProvider for NiftyTraderClient {
    #[instrument(skip(self))]
    async fn fetch_fii_dii(&self, period: &FlowPeriod) -> Result<Value> {
        let data = self
            .get_json(
                "/webapi/Resource/fii-dii-activity-data",
                &[
                    ("request_type", period.request_type.as_str()),
                    ("year_month", period.year_month.as_str()),
                ],
            )
            .await?;

        info!(year_month = %period.year_month, "FII/DII 데이터 조회 완료");
        Ok(data)
    }

    #[instrument(skip(self))]
    async fn fetch_ipos(&self) -> Result<Value> {
        let body = self.get_json("/webapi/Other/ipo-company-list", &[]).await?;

        // resultData 누락 시 빈 목록
        let ipos = match body {
            Value::Object(mut map) => map
                .remove("resultData")
                .filter(|v| !v.is_null())
                .unwrap_or_else(|| Value::Array(Vec::new())),
            _ => Value::Array(Vec::new()),
        };

        info!(
            count = ipos.as_array().map(|a| a.len()).unwrap_or(0),
            "IPO 목록 조회 완료"
        );
        Ok(ipos)
    }
}
