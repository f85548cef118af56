use common::config::{AppConfig, AssetConfig};
use common::errors::AppError;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
struct UploadReq<'a> {
    file: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResp {
    secure_url: String,
}

/// 图床客户端：上传 base64 编码的图片，换取持久 URL
///
/// 消息记录里只存图床返回的 URL，绝不落原始数据
#[derive(Debug)]
pub struct AssetService {
    client: reqwest::Client,
    config: AssetConfig,
}

impl AssetService {
    pub fn new(config: AssetConfig) -> Self {
        let timeout = config.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .expect("Failed to build asset http client");
        Self { client, config }
    }

    /// 上传图片并返回图床 URL；上传失败时消息不会入库
    pub async fn upload_image(&self, image: &str) -> Result<String, AppError> {
        if self.config.upload_url.is_empty() {
            return Err(AppError::ExternalApi("asset upload_url is not configured".to_string()));
        }
        let resp = self.client.post(&self.config.upload_url).json(&UploadReq { file: image }).send().await?;
        if !resp.status().is_success() {
            return Err(AppError::ExternalApi(format!("asset host returned {}", resp.status())));
        }
        let body: UploadResp = resp.json().await?;
        Ok(body.secure_url)
    }

    /// 初始化单例（仅运行一次）
    pub fn init() {
        let config = AppConfig::get().get_asset();
        ASSET_SERVICE.set(Arc::new(Self::new(config))).expect("AssetService already initialized");
    }

    /// 获取单例
    pub fn get() -> Arc<Self> {
        ASSET_SERVICE.get().expect("AssetService is not initialized").clone()
    }
}

static ASSET_SERVICE: OnceCell<Arc<AssetService>> = OnceCell::new();
