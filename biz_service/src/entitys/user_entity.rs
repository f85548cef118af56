use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 用户信息结构体，用于存储账号与身份信息
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoEntity {
    /// 用户唯一 ID
    #[serde(rename = "_id")]
    pub id: String,
    /// 用户名（用于登录，唯一）
    pub user_name: String,
    /// 显示昵称
    pub nick_name: String,
    /// 头像 URL
    pub avatar: String,
    /// 加盐 md5 密码哈希，绝不返回给客户端
    pub password: String,
    /// 创建时间（Unix 时间戳，秒）
    pub create_time: i64,
    /// 最后更新时间（Unix 时间戳，秒）
    pub update_time: i64,
}

impl UserInfoEntity {
    pub const COLLECTION: &'static str = "user_info";
}
