use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tera::Context;
use tracing::info;

use crate::domain::error::DomainError;
use crate::presentation::dto::TagForm;
use crate::presentation::flash::{Flash, redirect_with};
use crate::presentation::middleware::request_id;
use crate::presentation::pages::{back_to_form, render};
use crate::server::AppState;

#[get("/tags")]
pub async fn list_tags(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, DomainError> {
    let tags = state.tags.list_tags().await?;

    let mut ctx = Context::new();
    ctx.insert("tags", &tags);
    render(&req, &state.templates, "tags/list.html", ctx)
}

#[get("/tags/new")]
pub async fn new_tag_form(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, DomainError> {
    render(&req, &state.templates, "tags/new.html", Context::new())
}

#[post("/tags/new")]
pub async fn create_tag(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Form<TagForm>,
) -> Result<HttpResponse, DomainError> {
    let tag = match state.tags.create_tag(&form.name).await {
        Ok(tag) => tag,
        Err(err) => return back_to_form(err, "/tags/new"),
    };

    info!(request_id = %request_id(&req), tag_id = tag.id, "tag added");

    Ok(redirect_with(
        "/tags",
        Flash::success(format!("Tag {} added", tag.name)),
    ))
}

#[get("/tags/{id:\\d+}")]
pub async fn show_tag(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, DomainError> {
    let detail = state.tags.get_tag_detail(path.into_inner()).await?;

    let mut ctx = Context::new();
    ctx.insert("tag", &detail.tag);
    ctx.insert("posts", &detail.posts);
    render(&req, &state.templates, "tags/detail.html", ctx)
}

#[get("/tags/{id:\\d+}/edit")]
pub async fn edit_tag_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, DomainError> {
    let tag = state.tags.get_tag(path.into_inner()).await?;

    let mut ctx = Context::new();
    ctx.insert("tag", &tag);
    render(&req, &state.templates, "tags/edit.html", ctx)
}

#[post("/tags/{id:\\d+}/edit")]
pub async fn update_tag(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    form: web::Form<TagForm>,
) -> Result<HttpResponse, DomainError> {
    let tag_id = path.into_inner();
    let tag = match state.tags.update_tag(tag_id, Some(form.name.as_str())).await {
        Ok(tag) => tag,
        Err(err) => return back_to_form(err, &format!("/tags/{}/edit", tag_id)),
    };

    info!(request_id = %request_id(&req), tag_id, "tag edited");

    Ok(redirect_with(
        "/tags",
        Flash::success(format!("Tag {} updated", tag.name)),
    ))
}

#[post("/tags/{id:\\d+}/delete")]
pub async fn delete_tag(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, DomainError> {
    let tag_id = path.into_inner();
    state.tags.delete_tag(tag_id).await?;

    info!(request_id = %request_id(&req), tag_id, "tag removed");

    Ok(redirect_with("/tags", Flash::success("Tag deleted")))
}
