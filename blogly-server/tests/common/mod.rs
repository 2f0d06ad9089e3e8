#![allow(dead_code)]

use actix_web::body::{BoxBody, EitherBody, MessageBody};
use actix_web::cookie::Cookie;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, test, web};
use blogly_server::application::post_service::PostService;
use blogly_server::application::tag_service::TagService;
use blogly_server::application::user_service::UserService;
use blogly_server::data::Repositories;
use blogly_server::domain::post::Post;
use blogly_server::domain::tag::Tag;
use blogly_server::domain::user::User;
use blogly_server::infrastructure::templates::Templates;
use blogly_server::server::{self, AppState};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// The full route table over `repos`, with the 404 page installed.
pub fn build_test_app(
    repos: &Repositories,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let templates = Templates::new().expect("templates compile");
    App::new()
        .wrap(server::error_pages())
        .app_data(web::Data::new(AppState::new(repos, templates)))
        .configure(server::configure)
}

pub async fn add_user(repos: &Repositories, first: &str, last: &str) -> User {
    UserService::new(repos)
        .create_user(first, last, "")
        .await
        .expect("user created")
}

pub async fn add_post(repos: &Repositories, user_id: i32, title: &str, content: &str, tags: &[i32]) -> Post {
    PostService::new(repos)
        .create_post(user_id, title, content, tags)
        .await
        .expect("post created")
}

pub async fn add_tag(repos: &Repositories, name: &str) -> Tag {
    TagService::new(repos)
        .create_tag(name)
        .await
        .expect("tag created")
}

pub fn post_form(uri: &str, body: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .insert_header((header::CONTENT_TYPE, FORM_CONTENT_TYPE))
        .set_payload(body.to_owned())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("redirect location")
        .to_owned()
}

/// A GET for wherever `resp` redirects, carrying the cookies it set.
pub fn follow<B>(resp: &ServiceResponse<B>) -> test::TestRequest {
    let cookies: Vec<Cookie<'static>> = resp
        .response()
        .cookies()
        .map(|cookie| cookie.into_owned())
        .collect();

    cookies
        .into_iter()
        .fold(test::TestRequest::get().uri(&location(resp)), |req, cookie| {
            req.cookie(cookie)
        })
}

pub async fn body_text<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
