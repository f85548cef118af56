pub mod asset_service;
pub mod auth_service;
pub mod message_service;
pub mod user_service;

use mongodb::Database;

/// 初始化全部业务服务单例
///
/// 依赖 AppConfig 与 Redis 连接池已先行初始化
pub fn init_service(db: Database) {
    user_service::UserService::init(db.clone());
    message_service::MessageService::init(db.clone());
    auth_service::AuthService::init();
    asset_service::AssetService::init();
}
