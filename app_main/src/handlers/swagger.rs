use crate::handlers::auth_handler::*;
use crate::handlers::message_handler::*;
use actix_web::{HttpResponse, Responder, get, web};
use biz_service::biz_services::user_service::UserProfile;
use biz_service::entitys::message_entity::{MessageEntity, ReactionEntity};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        //用户-认证
        auth_register,
        auth_login,
        auth_logout,

        //消息-管理
        list_users,
        list_conversation,
        send_message,
        edit_message,
        delete_message,
        react_message,
        seen_message,
    ),
    components(schemas(
        MessageEntity,
        ReactionEntity,
        UserProfile,
        SendMessageDto,
        EditMessageDto,
        ReactMessageDto,
        RegisterDto,
        LoginDto,
        AuthResp,
    )),
    tags(
        (name = "chat-cloud-api", description = "单聊消息与认证接口")
    )
)]
struct ApiDoc;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(openapi_json);
}

#[get("/openapi.json")]
async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().content_type("application/json").body(ApiDoc::openapi().to_json().unwrap())
}
