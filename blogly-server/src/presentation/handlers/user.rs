use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tera::Context;
use tracing::info;

use crate::domain::error::DomainError;
use crate::presentation::dto::UserForm;
use crate::presentation::flash::{Flash, redirect_with};
use crate::presentation::middleware::request_id;
use crate::presentation::pages::{back_to_form, render};
use crate::server::AppState;

#[get("/users")]
pub async fn list_users(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, DomainError> {
    let users = state.users.list_users().await?;

    let mut ctx = Context::new();
    ctx.insert("users", &users);
    render(&req, &state.templates, "users/list.html", ctx)
}

#[get("/users/new")]
pub async fn new_user_form(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, DomainError> {
    render(&req, &state.templates, "users/new.html", Context::new())
}

#[post("/users/new")]
pub async fn create_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Form<UserForm>,
) -> Result<HttpResponse, DomainError> {
    let user = match state
        .users
        .create_user(&form.first_name, &form.last_name, &form.image_url)
        .await
    {
        Ok(user) => user,
        Err(err) => return back_to_form(err, "/users/new"),
    };

    info!(request_id = %request_id(&req), user_id = user.id, "user added");

    Ok(redirect_with(
        &format!("/users/{}", user.id),
        Flash::success(format!("User {} added", user.full_name())),
    ))
}

#[get("/users/{id:\\d+}")]
pub async fn show_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, DomainError> {
    let detail = state.users.get_user_detail(path.into_inner()).await?;

    let mut ctx = Context::new();
    ctx.insert("user", &detail.user);
    ctx.insert("posts", &detail.posts);
    render(&req, &state.templates, "users/detail.html", ctx)
}

#[get("/users/{id:\\d+}/edit")]
pub async fn edit_user_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, DomainError> {
    let user = state.users.get_user(path.into_inner()).await?;

    let mut ctx = Context::new();
    ctx.insert("user", &user);
    render(&req, &state.templates, "users/edit.html", ctx)
}

#[post("/users/{id:\\d+}/edit")]
pub async fn update_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    form: web::Form<UserForm>,
) -> Result<HttpResponse, DomainError> {
    let user_id = path.into_inner();
    let user = match state
        .users
        .update_user(
            user_id,
            Some(form.first_name.as_str()),
            Some(form.last_name.as_str()),
            Some(form.image_url.as_str()),
        )
        .await
    {
        Ok(user) => user,
        Err(err) => return back_to_form(err, &format!("/users/{}/edit", user_id)),
    };

    info!(request_id = %request_id(&req), user_id, "user edited");

    Ok(redirect_with(
        &format!("/users/{}", user.id),
        Flash::success(format!("User {} updated", user.full_name())),
    ))
}

#[post("/users/{id:\\d+}/delete")]
pub async fn delete_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, DomainError> {
    let user_id = path.into_inner();
    state.users.delete_user(user_id).await?;

    info!(request_id = %request_id(&req), user_id, "user removed");

    Ok(redirect_with("/users", Flash::success("User deleted")))
}
