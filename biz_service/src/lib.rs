use mongodb::Database;

pub mod biz_services;
pub mod entitys;
pub mod manager;

pub fn init_service(db: Database) {
    biz_services::init_service(db);
}
