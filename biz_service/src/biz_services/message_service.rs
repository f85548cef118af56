use crate::biz_services::asset_service::AssetService;
use crate::biz_services::user_service::UserService;
use crate::entitys::message_entity::MessageEntity;
use crate::manager::socket_manager::{SocketEvent, get_socket_manager};
use common::errors::AppError;
use common::repository_util::{BaseRepository, OrderType, Repository};
use common::util::common_utils::build_id;
use common::util::date_util::now;
use mongodb::Database;
use mongodb::bson::{Document, doc, to_bson};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// 会话查询条件：两个方向的并集，对 (a, b) 与 (b, a) 等价
pub fn conversation_filter(a: &str, b: &str) -> Document {
    doc! {
        "$or": [
            { "senderId": a, "receiverId": b },
            { "senderId": b, "receiverId": a },
        ]
    }
}

/// 编辑更新：改写文本并置 isEdited，不触碰其它字段
pub fn edit_update(text: &str, ts: i64) -> Document {
    doc! { "$set": { "text": text, "isEdited": true, "updateTime": ts } }
}

/// 已读更新：$addToSet 保证同一用户重复标记不产生重复项
pub fn seen_update(acting_uid: &str, ts: i64) -> Document {
    doc! { "$addToSet": { "seenBy": acting_uid }, "$set": { "updateTime": ts } }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or("").is_empty()
}

/// 目标消息不存在（已删或 id 错误）时统一映射为 NotFound
fn found_or_not<T>(value: Option<T>) -> Result<T, AppError> {
    value.ok_or(AppError::NotFound)
}

/// 单聊消息生命周期：发送、查询、编辑、删除、表情回应、已读
#[derive(Debug)]
pub struct MessageService {
    pub dao: BaseRepository<MessageEntity>,
}

impl MessageService {
    pub fn new(db: Database) -> Self {
        let collection = db.collection::<MessageEntity>(MessageEntity::COLLECTION);
        Self { dao: BaseRepository::new(collection) }
    }

    /// 查询两用户间全部消息，按创建时间升序
    pub async fn list_conversation(&self, a: &str, b: &str) -> Result<Vec<MessageEntity>, AppError> {
        Ok(self.dao.query_sorted(conversation_filter(a, b), "createTime", OrderType::Asc).await?)
    }

    /// 发送消息
    ///
    /// 文本与图片不能同时为空；带图片时先上传图床，入库的是图床 URL。
    /// 入库成功后向接收者的活跃连接推送 newMessage 事件（离线则丢弃）。
    pub async fn send(
        &self,
        sender_id: &str,
        receiver_id: &str,
        text: Option<String>,
        image: Option<String>,
        reply_to: Option<String>,
    ) -> Result<MessageEntity, AppError> {
        if is_blank(&text) && is_blank(&image) {
            return Err(AppError::Validation("message text and image cannot both be empty".to_string()));
        }
        if UserService::get().find_by_id(receiver_id).await?.is_none() {
            return Err(AppError::Validation(format!("receiver {} does not exist", receiver_id)));
        }

        let image_url = match image {
            Some(raw) if !raw.trim().is_empty() => Some(AssetService::get().upload_image(&raw).await?),
            _ => None,
        };

        let ts = now();
        let entity = MessageEntity {
            id: build_id(),
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            text: text.filter(|t| !t.trim().is_empty()),
            image: image_url,
            reply_to: reply_to.filter(|r| !r.trim().is_empty()),
            reactions: vec![],
            seen_by: vec![],
            is_edited: false,
            create_time: ts,
            update_time: ts,
        };
        self.dao.insert(&entity).await?;

        get_socket_manager().notify(receiver_id, &SocketEvent::NewMessage(entity.clone()));
        Ok(entity)
    }

    /// 编辑消息文本：仅发送者可编辑，isEdited 置为 true 后不再回退
    pub async fn edit(&self, message_id: &str, acting_uid: &str, text: &str) -> Result<MessageEntity, AppError> {
        let message = found_or_not(self.dao.find_by_id(message_id).await?)?;
        if message.sender_id != acting_uid {
            return Err(AppError::Forbidden);
        }
        found_or_not(self.dao.update_by_id(message_id, edit_update(text, now())).await?)
    }

    /// 硬删除消息，返回被删记录；引用它的 replyTo 保持悬挂
    pub async fn delete(&self, message_id: &str, acting_uid: &str) -> Result<MessageEntity, AppError> {
        let message = found_or_not(self.dao.find_by_id(message_id).await?)?;
        if message.sender_id != acting_uid {
            return Err(AppError::Forbidden);
        }
        let deleted = self.dao.delete_by_id(message_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound);
        }
        Ok(message)
    }

    /// 表情回应：同一用户重复回应时替换，不同用户追加
    pub async fn react(&self, message_id: &str, acting_uid: &str, emoji: &str) -> Result<MessageEntity, AppError> {
        if emoji.trim().is_empty() {
            return Err(AppError::Validation("reaction cannot be empty".to_string()));
        }
        let mut message = found_or_not(self.dao.find_by_id(message_id).await?)?;
        message.upsert_reaction(acting_uid, emoji);
        let reactions = to_bson(&message.reactions).map_err(|e| AppError::Internal(e.to_string()))?;
        found_or_not(
            self.dao
                .update_by_id(message_id, doc! { "$set": { "reactions": reactions, "updateTime": now() } })
                .await?,
        )
    }

    /// 标记已读
    pub async fn mark_seen(&self, message_id: &str, acting_uid: &str) -> Result<MessageEntity, AppError> {
        found_or_not(self.dao.update_by_id(message_id, seen_update(acting_uid, now())).await?)
    }

    /// 初始化单例（仅运行一次）
    pub fn init(db: Database) {
        let instance = Self::new(db);
        MESSAGE_SERVICE.set(Arc::new(instance)).expect("MessageService already initialized");
    }

    /// 获取单例
    pub fn get() -> Arc<Self> {
        MESSAGE_SERVICE.get().expect("MessageService is not initialized").clone()
    }
}

static MESSAGE_SERVICE: OnceCell<Arc<MessageService>> = OnceCell::new();

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Bson;

    fn or_branches(filter: &Document) -> Vec<Document> {
        match filter.get("$or") {
            Some(Bson::Array(items)) => items
                .iter()
                .map(|item| item.as_document().cloned().unwrap())
                .collect(),
            _ => panic!("filter must contain $or"),
        }
    }

    #[test]
    fn test_conversation_filter_covers_both_directions() {
        let branches = or_branches(&conversation_filter("a", "b"));
        assert_eq!(branches.len(), 2);
        assert!(branches.contains(&doc! { "senderId": "a", "receiverId": "b" }));
        assert!(branches.contains(&doc! { "senderId": "b", "receiverId": "a" }));
    }

    #[test]
    fn test_conversation_filter_symmetric() {
        let mut ab = or_branches(&conversation_filter("a", "b"));
        let mut ba = or_branches(&conversation_filter("b", "a"));
        let key = |d: &Document| format!("{}", d);
        ab.sort_by_key(&key);
        ba.sort_by_key(&key);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_seen_update_dedupes_repeat_marks() {
        let update = seen_update("u2", 42);
        // 去重由 $addToSet 承担，绝不能退化为 $push
        let add = update.get_document("$addToSet").unwrap();
        assert_eq!(add.get_str("seenBy").unwrap(), "u2");
        assert!(update.get("$push").is_none());
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_i64("updateTime").unwrap(), 42);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_edit_update_sets_flag_and_touches_nothing_else() {
        let update = edit_update("changed", 42);
        assert_eq!(update.len(), 1);
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("text").unwrap(), "changed");
        assert!(set.get_bool("isEdited").unwrap());
        assert_eq!(set.get_i64("updateTime").unwrap(), 42);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_missing_message_maps_to_not_found() {
        // 编辑不存在的 id、删除后再删，find/update 均返回 None
        assert!(matches!(found_or_not::<MessageEntity>(None), Err(AppError::NotFound)));
        let entity = MessageEntity {
            id: "m1".to_string(),
            sender_id: "u1".to_string(),
            receiver_id: "u2".to_string(),
            text: Some("hi".to_string()),
            image: None,
            reply_to: None,
            reactions: vec![],
            seen_by: vec![],
            is_edited: false,
            create_time: 1,
            update_time: 1,
        };
        assert_eq!(found_or_not(Some(entity)).unwrap().id, "m1");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&None));
        assert!(is_blank(&Some("".to_string())));
        assert!(is_blank(&Some("   ".to_string())));
        assert!(!is_blank(&Some("hi".to_string())));
    }
}
