use crate::entitys::user_entity::UserInfoEntity;
use crate::manager::socket_manager::get_socket_manager;
use common::errors::AppError;
use common::repository_util::{BaseRepository, Repository};
use common::util::common_utils::build_id;
use common::util::date_util::now;
use mongodb::Database;
use mongodb::bson::doc;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// 返回给客户端的用户视图：剔除密码，并合并实时在线状态
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_name: String,
    pub nick_name: String,
    pub avatar: String,
    /// 当前是否持有活跃连接
    pub online: bool,
    /// 最近一次下线时间（Unix 秒），从未上线过则缺省
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<i64>,
}

impl UserProfile {
    pub fn from_entity(entity: UserInfoEntity, online: bool, last_seen: Option<i64>) -> Self {
        Self {
            id: entity.id,
            user_name: entity.user_name,
            nick_name: entity.nick_name,
            avatar: entity.avatar,
            online,
            last_seen,
        }
    }
}

#[derive(Debug)]
pub struct UserService {
    pub dao: BaseRepository<UserInfoEntity>,
}

impl UserService {
    pub fn new(db: Database) -> Self {
        let collection = db.collection::<UserInfoEntity>(UserInfoEntity::COLLECTION);
        Self { dao: BaseRepository::new(collection) }
    }

    /// 创建用户；用户名已存在时返回 Conflict
    pub async fn create_user(&self, user_name: &str, nick_name: &str, password_hash: &str, avatar: &str) -> Result<UserInfoEntity, AppError> {
        if self.find_by_user_name(user_name).await?.is_some() {
            return Err(AppError::Conflict);
        }
        let ts = now();
        let entity = UserInfoEntity {
            id: build_id(),
            user_name: user_name.to_string(),
            nick_name: nick_name.to_string(),
            avatar: avatar.to_string(),
            password: password_hash.to_string(),
            create_time: ts,
            update_time: ts,
        };
        self.dao.insert(&entity).await?;
        Ok(entity)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<UserInfoEntity>, AppError> {
        Ok(self.dao.find_by_id(id).await?)
    }

    pub async fn find_by_user_name(&self, user_name: &str) -> Result<Option<UserInfoEntity>, AppError> {
        Ok(self.dao.find_one(doc! { "userName": user_name }).await?)
    }

    /// 会话侧边栏用户列表：排除自己、剔除密码、合并在线状态
    pub async fn list_others(&self, exclude_uid: &str) -> Result<Vec<UserProfile>, AppError> {
        let manager = get_socket_manager();
        let users = self.dao.query_all().await?;
        let profiles = users
            .into_iter()
            .filter(|u| u.id != exclude_uid)
            .map(|u| {
                let online = manager.is_online(&u.id);
                let last_seen = manager.last_seen(&u.id);
                UserProfile::from_entity(u, online, last_seen)
            })
            .collect();
        Ok(profiles)
    }

    /// 初始化单例（仅运行一次）
    pub fn init(db: Database) {
        let instance = Self::new(db);
        USER_SERVICE.set(Arc::new(instance)).expect("UserService already initialized");
    }

    /// 获取单例
    pub fn get() -> Arc<Self> {
        USER_SERVICE.get().expect("UserService is not initialized").clone()
    }
}

static USER_SERVICE: OnceCell<Arc<UserService>> = OnceCell::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_never_exposes_password() {
        let entity = UserInfoEntity {
            id: "u1".to_string(),
            user_name: "alice".to_string(),
            nick_name: "Alice".to_string(),
            avatar: "".to_string(),
            password: "secret-hash".to_string(),
            create_time: 1,
            update_time: 1,
        };
        let profile = UserProfile::from_entity(entity, true, None);
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["_id"], "u1");
        assert_eq!(json["online"], true);
        assert!(json.get("password").is_none());
        assert!(json.get("lastSeen").is_none());
    }
}
