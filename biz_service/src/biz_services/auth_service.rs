use actix_web::HttpRequest;
use common::UserId;
use common::config::AppConfig;
use common::errors::AppError;
use common::redis::{RedisTemplate, get_redis_pool};
use common::util::common_utils::{build_id, build_md5};
use once_cell::sync::OnceCell;
use std::sync::Arc;

const TOKEN_KEY_PREFIX: &str = "auth:token:";

/// 加盐密码哈希（盐取自 SysConfig.md5_key）
pub fn salt_password(raw: &str, salt: &str) -> String {
    build_md5(&format!("{}:{}", salt, raw))
}

/// 会话服务：token 签发、校验与注销，token -> uid 映射存 Redis 并带 TTL
#[derive(Debug)]
pub struct AuthService {
    template: RedisTemplate,
}

impl AuthService {
    pub fn new(template: RedisTemplate) -> Self {
        Self { template }
    }

    pub fn hash_password(&self, raw: &str) -> String {
        salt_password(raw, &AppConfig::get().get_sys().md5_key)
    }

    /// 为用户签发新 token
    pub async fn issue_token(&self, uid: &str) -> Result<String, AppError> {
        let token = build_id();
        let ttl = AppConfig::get().get_sys().token_ttl;
        self.template.set_key_value_ex(format!("{}{}", TOKEN_KEY_PREFIX, token), &uid.to_string(), ttl).await?;
        Ok(token)
    }

    /// 校验 token，返回对应的用户 ID
    pub async fn verify_token(&self, token: &str) -> Result<Option<UserId>, AppError> {
        self.template.get_key_value::<UserId>(format!("{}{}", TOKEN_KEY_PREFIX, token)).await
    }

    pub async fn revoke_token(&self, token: &str) -> Result<(), AppError> {
        self.template.delete_key(format!("{}{}", TOKEN_KEY_PREFIX, token)).await?;
        Ok(())
    }

    /// 从请求头解析 token 并解析出当前操作用户，失败直接短路为 401
    pub async fn check_request(&self, req: &HttpRequest) -> Result<UserId, AppError> {
        let token = extract_token(req).ok_or_else(|| AppError::Unauthorized("token required".to_string()))?;
        self.verify_token(&token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid or expired token".to_string()))
    }

    /// 初始化单例（仅运行一次）
    pub fn init() {
        let template = RedisTemplate::new(get_redis_pool().as_ref().clone());
        AUTH_SERVICE.set(Arc::new(Self::new(template))).expect("AuthService already initialized");
    }

    /// 获取单例
    pub fn get() -> Arc<Self> {
        AUTH_SERVICE.get().expect("AuthService is not initialized").clone()
    }
}

/// 从 Header 提取 token 字段
pub fn extract_token(req: &HttpRequest) -> Option<String> {
    let token = req.headers().get("token")?.to_str().ok()?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

static AUTH_SERVICE: OnceCell<Arc<AuthService>> = OnceCell::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salt_password_deterministic() {
        let a = salt_password("123456", "k1");
        let b = salt_password("123456", "k1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn test_salt_password_depends_on_salt() {
        assert_ne!(salt_password("123456", "k1"), salt_password("123456", "k2"));
    }
}
