pub mod qr;
pub mod summary;
pub mod view;

use actix_web::web;

use crate::error::json_error;

pub fn init(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error));
    qr::init(cfg);
    summary::init(cfg);
    view::init(cfg);
}
