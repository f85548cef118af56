use crate::errors::AppError;
use deadpool_redis::Pool;
use deadpool_redis::redis::cmd;
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Clone, Debug)]
pub struct RedisTemplate {
    pub pool: Pool,
}

impl RedisTemplate {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// 设置键值并附带过期时间（SET ... EX）
    pub async fn set_key_value_ex<T>(&self, key: impl AsRef<str>, value: &T, ttl_secs: u64) -> Result<(), AppError>
    where
        T: Serialize + Sync,
    {
        let mut conn = self.pool.get().await?;
        let json_value = serde_json::to_string(value)?;
        let _: () = cmd("SET").arg(key.as_ref()).arg(json_value).arg("EX").arg(ttl_secs).query_async(&mut conn).await?;
        Ok(())
    }

    /// 获取键值（不存在返回 None）
    pub async fn get_key_value<T>(&self, key: impl AsRef<str>) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned,
    {
        let mut conn = self.pool.get().await?;
        let value: Option<String> = cmd("GET").arg(key.as_ref()).query_async(&mut conn).await?;
        match value {
            Some(v) => Ok(Some(serde_json::from_str(&v)?)),
            None => Ok(None),
        }
    }

    /// 删除键（DEL），返回是否确实删除
    pub async fn delete_key(&self, key: impl AsRef<str>) -> Result<bool, AppError> {
        let mut conn = self.pool.get().await?;
        let count: i64 = cmd("DEL").arg(key.as_ref()).query_async(&mut conn).await?;
        Ok(count > 0)
    }
}
