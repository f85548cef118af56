use crate::entitys::message_entity::MessageEntity;
use common::UserId;
use common::util::date_util::now;
use dashmap::DashMap;
use log::{debug, warn};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

/// 推送给客户端的实时事件，序列化为 `{"event": ..., "payload": ...}` 文本帧
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum SocketEvent {
    /// 新消息，仅推送给接收者
    NewMessage(MessageEntity),
    /// 在线状态变化，广播给所有连接
    OnlineUsers(Vec<UserId>),
}

#[derive(Clone)]
pub struct ConnectionInfo {
    /// 连接唯一 ID，用于防止被顶号的旧会话误删新连接
    pub conn_id: String,
    pub sender: mpsc::UnboundedSender<String>,
}

/// 在线连接管理器：用户 ID -> 至多一条活跃连接
///
/// 同一用户重复登录时新连接顶掉旧连接；下线事件只在 conn_id
/// 仍然匹配时生效。离线用户的 notify 静默丢弃，不排队不重试。
pub struct SocketManager {
    connections: DashMap<UserId, ConnectionInfo>,
    last_seen: DashMap<UserId, i64>,
}

impl SocketManager {
    pub fn new() -> Self {
        Self { connections: DashMap::new(), last_seen: DashMap::new() }
    }

    /// 注册连接并广播最新在线列表；返回被顶掉的旧连接（如有）
    pub fn register(&self, user_id: &str, conn: ConnectionInfo) -> Option<ConnectionInfo> {
        let evicted = self.connections.insert(user_id.to_string(), conn);
        if evicted.is_some() {
            debug!("connection replaced for user {}", user_id);
        }
        self.broadcast_online_users();
        evicted
    }

    /// 注销连接；conn_id 不匹配说明该会话已被顶掉，直接忽略
    pub fn unregister(&self, user_id: &str, conn_id: &str) {
        let removed = self.connections.remove_if(user_id, |_, conn| conn.conn_id == conn_id);
        if removed.is_some() {
            self.last_seen.insert(user_id.to_string(), now());
            self.broadcast_online_users();
        }
    }

    /// 向指定用户推送事件；用户不在线时为静默 no-op
    pub fn notify(&self, user_id: &str, event: &SocketEvent) {
        let Some(conn) = self.connections.get(user_id) else {
            debug!("notify dropped, user {} offline", user_id);
            return;
        };
        match serde_json::to_string(event) {
            Ok(text) => {
                if conn.sender.send(text).is_err() {
                    warn!("notify failed, connection of user {} already closed", user_id);
                }
            }
            Err(e) => warn!("socket event serialize failed: {:?}", e),
        }
    }

    pub fn list_online_user_ids(&self) -> Vec<UserId> {
        self.connections.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.connections.contains_key(user_id)
    }

    pub fn last_seen(&self, user_id: &str) -> Option<i64> {
        self.last_seen.get(user_id).map(|v| *v)
    }

    /// 上下线时把在线用户列表广播给所有活跃连接
    fn broadcast_online_users(&self) {
        let event = SocketEvent::OnlineUsers(self.list_online_user_ids());
        let text = match serde_json::to_string(&event) {
            Ok(text) => text,
            Err(e) => {
                warn!("socket event serialize failed: {:?}", e);
                return;
            }
        };
        for entry in self.connections.iter() {
            let _ = entry.value().sender.send(text.clone());
        }
    }
}

static SOCKET_MANAGER: OnceCell<Arc<SocketManager>> = OnceCell::new();

/// 获取全局 SocketManager 单例
pub fn get_socket_manager() -> Arc<SocketManager> {
    SOCKET_MANAGER.get_or_init(|| Arc::new(SocketManager::new())).clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::util::common_utils::build_id;

    fn connect(manager: &SocketManager, user_id: &str) -> (String, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn_id = build_id();
        manager.register(user_id, ConnectionInfo { conn_id: conn_id.clone(), sender: tx });
        (conn_id, rx)
    }

    #[tokio::test]
    async fn test_notify_offline_is_noop() {
        let manager = SocketManager::new();
        manager.notify("nobody", &SocketEvent::OnlineUsers(vec![]));
        assert!(!manager.is_online("nobody"));
    }

    #[tokio::test]
    async fn test_register_evicts_previous_connection() {
        let manager = SocketManager::new();
        let (_, mut old_rx) = connect(&manager, "u1");
        let (_, _new_rx) = connect(&manager, "u1");
        assert_eq!(manager.list_online_user_ids(), vec!["u1".to_string()]);
        // 旧连接的 sender 被丢弃后通道关闭
        old_rx.recv().await.unwrap(); // 注册时广播的 onlineUsers
        assert!(old_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stale_unregister_keeps_successor() {
        let manager = SocketManager::new();
        let (old_conn_id, _old_rx) = connect(&manager, "u1");
        let (_, _new_rx) = connect(&manager, "u1");
        manager.unregister("u1", &old_conn_id);
        assert!(manager.is_online("u1"));
    }

    #[tokio::test]
    async fn test_unregister_records_last_seen() {
        let manager = SocketManager::new();
        let (conn_id, _rx) = connect(&manager, "u1");
        assert!(manager.last_seen("u1").is_none());
        manager.unregister("u1", &conn_id);
        assert!(!manager.is_online("u1"));
        assert!(manager.last_seen("u1").is_some());
    }

    #[tokio::test]
    async fn test_online_users_broadcast_on_register() {
        let manager = SocketManager::new();
        let (_, mut rx1) = connect(&manager, "u1");
        let first = rx1.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&first).unwrap();
        assert_eq!(value["event"], "onlineUsers");
        assert_eq!(value["payload"], serde_json::json!(["u1"]));

        let (_, _rx2) = connect(&manager, "u2");
        let second = rx1.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&second).unwrap();
        let mut ids: Vec<String> = serde_json::from_value(value["payload"].clone()).unwrap();
        ids.sort();
        assert_eq!(ids, vec!["u1".to_string(), "u2".to_string()]);
    }

    #[tokio::test]
    async fn test_notify_delivers_new_message_event() {
        let manager = SocketManager::new();
        let (_, mut rx) = connect(&manager, "u2");
        rx.recv().await.unwrap(); // onlineUsers

        let msg = MessageEntity {
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
        manager.notify("u2", &SocketEvent::NewMessage(msg));
        let frame = rx.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["event"], "newMessage");
        assert_eq!(value["payload"]["_id"], "m1");
        assert_eq!(value["payload"]["text"], "hi");
    }
}
