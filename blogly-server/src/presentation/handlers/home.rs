use actix_web::{HttpRequest, HttpResponse, get, web};
use tera::Context;

use crate::domain::error::DomainError;
use crate::presentation::dto::PostCard;
use crate::presentation::pages::render;
use crate::server::AppState;

const RECENT_POSTS: i64 = 5;

#[get("/")]
pub async fn home(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, DomainError> {
    let recent = state.posts.recent_posts(RECENT_POSTS).await?;
    let cards: Vec<PostCard<'_>> = recent.iter().map(PostCard::from).collect();

    let mut ctx = Context::new();
    ctx.insert("posts", &cards);
    render(&req, &state.templates, "home.html", ctx)
}
