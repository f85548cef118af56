use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 消息表情回应（一个用户最多保留一条）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReactionEntity {
    /// 回应者用户 ID
    pub user_id: String,
    /// 表情内容（如 👍、😂）
    pub emoji: String,
}

/// ======================================
/// 💬 单聊消息结构
/// ======================================
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageEntity {
    /// 消息唯一 ID
    #[serde(rename = "_id")]
    pub id: String,
    /// 发送者用户 ID（创建后不可变）
    pub sender_id: String,
    /// 接收者用户 ID（创建后不可变）
    pub receiver_id: String,
    /// 文本内容
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// 图片 URL（图床返回的持久地址，绝不存原始数据）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// 被引用（回复）的消息 ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    /// 表情回应列表
    #[serde(default)]
    pub reactions: Vec<ReactionEntity>,
    /// 已读用户 ID 集合
    #[serde(default)]
    pub seen_by: Vec<String>,
    /// 文本是否被编辑过（一旦为 true 不再回退）
    #[serde(default)]
    pub is_edited: bool,
    /// 创建时间（Unix 时间戳，秒）
    pub create_time: i64,
    /// 最后更新时间（Unix 时间戳，秒）
    pub update_time: i64,
}

impl MessageEntity {
    pub const COLLECTION: &'static str = "message_info";

    /// 写入或替换某个用户的表情回应：同一用户只保留最新一条，新用户追加
    pub fn upsert_reaction(&mut self, user_id: &str, emoji: &str) {
        match self.reactions.iter_mut().find(|r| r.user_id == user_id) {
            Some(existing) => existing.emoji = emoji.to_string(),
            None => self.reactions.push(ReactionEntity { user_id: user_id.to_string(), emoji: emoji.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MessageEntity {
        MessageEntity {
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
        }
    }

    #[test]
    fn test_upsert_reaction_appends_per_user() {
        let mut msg = sample();
        msg.upsert_reaction("u2", "👍");
        msg.upsert_reaction("u3", "😂");
        assert_eq!(msg.reactions.len(), 2);
        assert_eq!(msg.reactions[0].emoji, "👍");
    }

    #[test]
    fn test_upsert_reaction_replaces_same_user() {
        let mut msg = sample();
        msg.upsert_reaction("u2", "👍");
        msg.upsert_reaction("u2", "❤️");
        assert_eq!(msg.reactions.len(), 1);
        assert_eq!(msg.reactions[0].emoji, "❤️");
    }

    #[test]
    fn test_wire_shape() {
        let msg = sample();
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["_id"], "m1");
        assert_eq!(json["senderId"], "u1");
        assert_eq!(json["receiverId"], "u2");
        assert_eq!(json["isEdited"], false);
        // 空字段不出现在序列化结果中
        assert!(json.get("image").is_none());
        assert!(json.get("replyTo").is_none());
    }
}
