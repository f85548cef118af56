use crate::config::DatabaseConfig;
use anyhow::{Result, anyhow};
use log::info;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use once_cell::sync::OnceCell;

static DATABASE: OnceCell<Database> = OnceCell::new();

/// 全局 MongoDB 句柄，进程启动时初始化一次
pub struct Db;

impl Db {
    /// 解析连接串并登记全局 Database（重复调用报错）
    pub async fn init(config: &DatabaseConfig) -> Result<()> {
        let mut options = ClientOptions::parse(&config.url)
            .await
            .map_err(|e| anyhow!("MongoDB URI parse error: {}", e))?;
        options.app_name = Some("chat_cloud".to_string());

        let client = Client::with_options(options)
            .map_err(|e| anyhow!("MongoDB client init error: {}", e))?;
        let db = client.database(&config.db_name);
        info!("MongoDB handle ready, database: {}", config.db_name);

        DATABASE.set(db).map_err(|_| anyhow!("MongoDB already initialized"))
    }

    /// # Panics
    /// 若未初始化则 panic
    pub fn get() -> &'static Database {
        DATABASE.get().expect("MongoDB is not initialized")
    }
}
