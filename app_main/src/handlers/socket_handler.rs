use actix::{Actor, ActorContext, AsyncContext, Handler, Message as ActixMessage, StreamHandler};
use actix_web::{HttpRequest, HttpResponse, Responder, get, web};
use actix_web_actors::ws;
use biz_service::biz_services::auth_service::AuthService;
use biz_service::manager::socket_manager::{ConnectionInfo, get_socket_manager};
use common::errors::AppError;
use common::util::common_utils::build_id;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// 心跳间隔与客户端超时（超时未响应 ping 即断开）
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(ws_connect);
}

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: String,
}

/// 推送给客户端的序列化事件帧
#[derive(ActixMessage)]
#[rtype(result = "()")]
struct OutboundFrame(String);

/// 单个用户的 WebSocket 会话
///
/// 上线时在 SocketManager 注册（同一用户的旧连接被顶掉），
/// 下线时按 conn_id 注销；事件经 mpsc 通道泵入本会话。
struct WsSession {
    user_id: String,
    conn_id: String,
    hb: Instant,
}

impl WsSession {
    fn new(user_id: String) -> Self {
        Self { user_id, conn_id: build_id(), hb: Instant::now() }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                log::warn!("WebSocket heartbeat timeout, disconnecting user {}", act.user_id);
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.hb(ctx);

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        get_socket_manager().register(&self.user_id, ConnectionInfo { conn_id: self.conn_id.clone(), sender: tx });
        log::info!("WebSocket connected, user {}", self.user_id);

        // 写任务：把 SocketManager 推来的事件泵入会话
        let addr = ctx.address();
        tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                if addr.try_send(OutboundFrame(text)).is_err() {
                    break;
                }
            }
        });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        get_socket_manager().unregister(&self.user_id, &self.conn_id);
        log::info!("WebSocket disconnected, user {}", self.user_id);
    }
}

impl Handler<OutboundFrame> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: OutboundFrame, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.hb = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            // 推送通道为单向，客户端文本帧仅当作心跳
            Ok(ws::Message::Text(_)) | Ok(ws::Message::Binary(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("WebSocket protocol error: {:?}", e);
                ctx.stop();
            }
        }
    }
}

/// WebSocket 握手入口：`GET /ws?token=...`
#[get("/ws")]
async fn ws_connect(req: HttpRequest, stream: web::Payload, query: web::Query<WsParams>) -> Result<impl Responder, AppError> {
    let uid = AuthService::get()
        .verify_token(&query.token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid or expired token".to_string()))?;
    let resp: HttpResponse = ws::start(WsSession::new(uid), &req, stream).map_err(|e| AppError::SocketError(e.to_string()))?;
    Ok(resp)
}
