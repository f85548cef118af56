use actix_web::{HttpRequest, HttpResponse, Responder, delete, get, post, put, web};
use biz_service::biz_services::auth_service::AuthService;
use biz_service::biz_services::message_service::MessageService;
use biz_service::biz_services::user_service::{UserProfile, UserService};
use biz_service::entitys::message_entity::MessageEntity;
use common::errors::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users);
    cfg.service(send_message);
    cfg.service(edit_message);
    cfg.service(delete_message);
    cfg.service(react_message);
    cfg.service(seen_message);
    // 动态路径必须最后注册，避免吞掉 /users
    cfg.service(list_conversation);
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageDto {
    #[schema(example = "hello")]
    pub text: Option<String>,
    /// base64 编码的图片数据，上传图床后只存返回的 URL
    pub image: Option<String>,
    /// 被回复的消息 ID
    pub reply_to: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditMessageDto {
    #[validate(length(min = 1, message = "文本不能为空"))]
    pub text: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReactMessageDto {
    #[validate(length(min = 1, message = "表情不能为空"))]
    pub reaction: String,
}

#[utoipa::path(
    get,
    path = "/api/message/users",
    tag = "消息-管理",
    summary = "会话侧边栏用户列表（不含密码，带在线状态）",
    responses((status = 200, description = "成功", body = Vec<UserProfile>))
)]
#[get("/api/message/users")]
pub async fn list_users(req: HttpRequest) -> Result<impl Responder, AppError> {
    let uid = AuthService::get().check_request(&req).await?;
    let users = UserService::get().list_others(&uid).await?;
    Ok(web::Json(users))
}

#[utoipa::path(
    get,
    path = "/api/message/{otherUserId}",
    tag = "消息-管理",
    summary = "拉取与指定用户的全部消息",
    responses((status = 200, description = "成功", body = Vec<MessageEntity>))
)]
#[get("/api/message/{otherUserId}")]
pub async fn list_conversation(req: HttpRequest, path: web::Path<String>) -> Result<impl Responder, AppError> {
    let uid = AuthService::get().check_request(&req).await?;
    let other_uid = path.into_inner();
    let messages = MessageService::get().list_conversation(&uid, &other_uid).await?;
    Ok(web::Json(messages))
}

#[utoipa::path(
    post,
    path = "/api/message/send/{receiverId}",
    tag = "消息-管理",
    summary = "发送消息（文本与图片不能同时为空）",
    request_body = SendMessageDto,
    responses(
        (status = 201, description = "创建成功", body = MessageEntity),
        (status = 400, description = "空消息或接收者不存在"),
    )
)]
#[post("/api/message/send/{receiverId}")]
pub async fn send_message(req: HttpRequest, path: web::Path<String>, dto: web::Json<SendMessageDto>) -> Result<impl Responder, AppError> {
    let uid = AuthService::get().check_request(&req).await?;
    let receiver_id = path.into_inner();
    let dto = dto.into_inner();
    let message = MessageService::get().send(&uid, &receiver_id, dto.text, dto.image, dto.reply_to).await?;
    Ok(HttpResponse::Created().json(message))
}

#[utoipa::path(
    put,
    path = "/api/message/edit/{messageId}",
    tag = "消息-管理",
    summary = "编辑消息文本（仅发送者）",
    request_body = EditMessageDto,
    responses(
        (status = 200, description = "成功", body = MessageEntity),
        (status = 404, description = "消息不存在"),
    )
)]
#[put("/api/message/edit/{messageId}")]
pub async fn edit_message(req: HttpRequest, path: web::Path<String>, dto: web::Json<EditMessageDto>) -> Result<impl Responder, AppError> {
    let uid = AuthService::get().check_request(&req).await?;
    dto.validate()?;
    let message_id = path.into_inner();
    let message = MessageService::get().edit(&message_id, &uid, &dto.text).await?;
    Ok(web::Json(message))
}

#[utoipa::path(
    delete,
    path = "/api/message/delete/{messageId}",
    tag = "消息-管理",
    summary = "删除消息（硬删除，仅发送者）",
    responses(
        (status = 200, description = "成功，返回被删消息", body = MessageEntity),
        (status = 404, description = "消息不存在"),
    )
)]
#[delete("/api/message/delete/{messageId}")]
pub async fn delete_message(req: HttpRequest, path: web::Path<String>) -> Result<impl Responder, AppError> {
    let uid = AuthService::get().check_request(&req).await?;
    let message_id = path.into_inner();
    let message = MessageService::get().delete(&message_id, &uid).await?;
    Ok(web::Json(message))
}

#[utoipa::path(
    post,
    path = "/api/message/react/{messageId}",
    tag = "消息-管理",
    summary = "表情回应（同一用户重复回应时替换）",
    request_body = ReactMessageDto,
    responses(
        (status = 200, description = "成功", body = MessageEntity),
        (status = 404, description = "消息不存在"),
    )
)]
#[post("/api/message/react/{messageId}")]
pub async fn react_message(req: HttpRequest, path: web::Path<String>, dto: web::Json<ReactMessageDto>) -> Result<impl Responder, AppError> {
    let uid = AuthService::get().check_request(&req).await?;
    dto.validate()?;
    let message_id = path.into_inner();
    let message = MessageService::get().react(&message_id, &uid, &dto.reaction).await?;
    Ok(web::Json(message))
}

#[utoipa::path(
    post,
    path = "/api/message/seen/{messageId}",
    tag = "消息-管理",
    summary = "标记已读（幂等）",
    responses(
        (status = 200, description = "成功", body = MessageEntity),
        (status = 404, description = "消息不存在"),
    )
)]
#[post("/api/message/seen/{messageId}")]
pub async fn seen_message(req: HttpRequest, path: web::Path<String>) -> Result<impl Responder, AppError> {
    let uid = AuthService::get().check_request(&req).await?;
    let message_id = path.into_inner();
    let message = MessageService::get().mark_seen(&message_id, &uid).await?;
    Ok(web::Json(message))
}
