use actix_web::{HttpRequest, Responder, post, web};
use biz_service::biz_services::auth_service::{AuthService, extract_token};
use biz_service::biz_services::user_service::{UserProfile, UserService};
use common::errors::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth_register);
    cfg.service(auth_login);
    cfg.service(auth_logout);
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDto {
    #[validate(length(min = 2, max = 64, message = "用户名长度为2~64"))]
    pub user_name: String,
    #[validate(length(min = 6, max = 64, message = "密码长度为6~64"))]
    pub password: String,
    #[validate(length(min = 0, max = 32, message = "昵称不能超过32个字符"))]
    pub nick_name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginDto {
    #[validate(length(min = 2, max = 64, message = "用户名长度为2~64"))]
    pub user_name: String,
    #[validate(length(min = 6, max = 64, message = "密码长度为6~64"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResp {
    #[schema(example = "b0c1d2e3f4a5....")]
    pub token: String,
    pub user: UserProfile,
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "用户-认证",
    summary = "注册新用户并签发 token",
    request_body = RegisterDto,
    responses(
        (status = 200, description = "成功", body = AuthResp),
        (status = 409, description = "用户名已存在"),
    )
)]
#[post("/api/auth/register")]
pub async fn auth_register(dto: web::Json<RegisterDto>) -> Result<impl Responder, AppError> {
    dto.validate()?;
    let auth = AuthService::get();
    let password_hash = auth.hash_password(&dto.password);
    let nick_name = dto.nick_name.clone().unwrap_or_else(|| dto.user_name.clone());
    let avatar = dto.avatar.clone().unwrap_or_default();
    let user = UserService::get().create_user(&dto.user_name, &nick_name, &password_hash, &avatar).await?;
    let token = auth.issue_token(&user.id).await?;
    Ok(web::Json(AuthResp { token, user: UserProfile::from_entity(user, false, None) }))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "用户-认证",
    summary = "用户登录",
    request_body = LoginDto,
    responses(
        (status = 200, description = "登录成功", body = AuthResp),
        (status = 401, description = "用户名或密码错误"),
    )
)]
#[post("/api/auth/login")]
pub async fn auth_login(dto: web::Json<LoginDto>) -> Result<impl Responder, AppError> {
    dto.validate()?;
    let auth = AuthService::get();
    let user = UserService::get()
        .find_by_user_name(&dto.user_name)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid credentials".to_string()))?;
    if auth.hash_password(&dto.password) != user.password {
        return Err(AppError::Unauthorized("invalid credentials".to_string()));
    }
    let token = auth.issue_token(&user.id).await?;
    Ok(web::Json(AuthResp { token, user: UserProfile::from_entity(user, false, None) }))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "用户-认证",
    summary = "注销当前会话 token",
    responses((status = 200, description = "成功"))
)]
#[post("/api/auth/logout")]
pub async fn auth_logout(req: HttpRequest) -> Result<impl Responder, AppError> {
    let auth = AuthService::get();
    // 校验后再注销，未登录的调用直接 401
    auth.check_request(&req).await?;
    if let Some(token) = extract_token(&req) {
        auth.revoke_token(&token).await?;
    }
    Ok(web::Json(json!({ "message": "logged out" })))
}
