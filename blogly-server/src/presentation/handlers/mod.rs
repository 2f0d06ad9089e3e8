pub mod home;
pub mod post;
pub mod tag;
pub mod user;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(home::home)
        .service(user::list_users)
        .service(user::new_user_form)
        .service(user::create_user)
        .service(user::show_user)
        .service(user::edit_user_form)
        .service(user::update_user)
        .service(user::delete_user)
        .service(post::new_post_form)
        .service(post::create_post)
        .service(post::show_post)
        .service(post::edit_post_form)
        .service(post::update_post)
        .service(post::delete_post)
        .service(tag::list_tags)
        .service(tag::new_tag_form)
        .service(tag::create_tag)
        .service(tag::show_tag)
        .service(tag::edit_tag_form)
        .service(tag::update_tag)
        .service(tag::delete_tag);
}
