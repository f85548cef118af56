pub mod auth_handler;
pub mod message_handler;
pub mod socket_handler;
pub mod swagger;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    auth_handler::configure(cfg);
    message_handler::configure(cfg);
    socket_handler::configure(cfg);
    swagger::configure(cfg);
}
