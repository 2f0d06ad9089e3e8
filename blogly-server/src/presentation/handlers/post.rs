use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tera::Context;
use tracing::info;

use crate::domain::error::DomainError;
use crate::presentation::dto::PostForm;
use crate::presentation::flash::{Flash, redirect_with};
use crate::presentation::middleware::request_id;
use crate::presentation::pages::{back_to_form, render};
use crate::server::AppState;

#[get("/users/{id:\\d+}/posts/new")]
pub async fn new_post_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, DomainError> {
    let user = state.users.get_user(path.into_inner()).await?;
    let tags = state.tags.list_tags().await?;

    let mut ctx = Context::new();
    ctx.insert("user", &user);
    ctx.insert("tags", &tags);
    render(&req, &state.templates, "posts/new.html", ctx)
}

#[post("/users/{id:\\d+}/posts/new")]
pub async fn create_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Bytes,
) -> Result<HttpResponse, DomainError> {
    let user_id = path.into_inner();
    let form = PostForm::parse(&body)?;

    let post = match state
        .posts
        .create_post(user_id, &form.title, &form.content, &form.tag_ids)
        .await
    {
        Ok(post) => post,
        Err(err) => return back_to_form(err, &format!("/users/{}/posts/new", user_id)),
    };

    info!(
        request_id = %request_id(&req),
        user_id,
        post_id = post.id,
        "post added"
    );

    Ok(redirect_with(
        &format!("/users/{}", user_id),
        Flash::success(format!("Post \"{}\" added", post.title)),
    ))
}

#[get("/posts/{id:\\d+}")]
pub async fn show_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, DomainError> {
    let detail = state.posts.get_post_detail(path.into_inner()).await?;

    let mut ctx = Context::new();
    ctx.insert("post", &detail.post);
    ctx.insert("user", &detail.user);
    ctx.insert("tags", &detail.tags);
    ctx.insert("created", &detail.post.display_created_at());
    render(&req, &state.templates, "posts/detail.html", ctx)
}

#[get("/posts/{id:\\d+}/edit")]
pub async fn edit_post_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, DomainError> {
    let detail = state.posts.get_post_detail(path.into_inner()).await?;
    let tags = state.tags.list_tags().await?;
    let attached: Vec<i32> = detail.tags.iter().map(|tag| tag.id).collect();

    let mut ctx = Context::new();
    ctx.insert("post", &detail.post);
    ctx.insert("tags", &tags);
    ctx.insert("attached", &attached);
    render(&req, &state.templates, "posts/edit.html", ctx)
}

#[post("/posts/{id:\\d+}/edit")]
pub async fn update_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Bytes,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let form = PostForm::parse(&body)?;

    let post = match state
        .posts
        .update_post(
            post_id,
            Some(form.title.as_str()),
            Some(form.content.as_str()),
            &form.tag_ids,
        )
        .await
    {
        Ok(post) => post,
        Err(err) => return back_to_form(err, &format!("/posts/{}/edit", post_id)),
    };

    info!(request_id = %request_id(&req), post_id, "post edited");

    Ok(redirect_with(
        &format!("/posts/{}", post.id),
        Flash::success(format!("Post \"{}\" updated", post.title)),
    ))
}

#[post("/posts/{id:\\d+}/delete")]
pub async fn delete_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, DomainError> {
    let post = state.posts.delete_post(path.into_inner()).await?;

    info!(
        request_id = %request_id(&req),
        post_id = post.id,
        user_id = post.user_id,
        "post removed"
    );

    Ok(redirect_with(
        &format!("/users/{}", post.user_id),
        Flash::success(format!("Post \"{}\" deleted", post.title)),
    ))
}
