pub mod message_entity;
pub mod user_entity;
