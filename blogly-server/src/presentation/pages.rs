use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::ContentType;
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{HttpRequest, HttpResponse, web};
use tera::Context;
use tracing::warn;

use crate::domain::error::DomainError;
use crate::infrastructure::templates::Templates;
use crate::presentation::flash::{self, Flash};
use crate::server::AppState;

pub const NOT_FOUND_TEMPLATE: &str = "not_found.html";

pub fn render(
    req: &HttpRequest,
    templates: &Templates,
    name: &str,
    mut ctx: Context,
) -> Result<HttpResponse, DomainError> {
    let pending = flash::pending(req);
    if let Some(notice) = &pending {
        ctx.insert("flash", notice);
    }

    let body = templates.render(name, &ctx)?;

    let mut builder = HttpResponse::Ok();
    builder.content_type(ContentType::html());
    if pending.is_some() {
        builder.cookie(flash::removal_cookie());
    }
    Ok(builder.body(body))
}

/// Sends a rejected form back to `form_path` with its notice. Anything other
/// than rejected input is passed through.
pub fn back_to_form(err: DomainError, form_path: &str) -> Result<HttpResponse, DomainError> {
    match err.notice() {
        Some(notice) => Ok(flash::redirect_with(form_path, Flash::error(notice))),
        None => Err(err),
    }
}

/// Replaces the body of every 404 with the "page not found" template. A
/// pending notice is shown there and cleared like on any other page.
pub fn not_found<B: MessageBody + 'static>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let (req, _) = res.into_parts();

    let pending = flash::pending(&req);
    let mut ctx = Context::new();
    if let Some(notice) = &pending {
        ctx.insert("flash", notice);
    }

    let body = req
        .app_data::<web::Data<AppState>>()
        .map(|state| state.templates.render(NOT_FOUND_TEMPLATE, &ctx))
        .transpose()
        .unwrap_or_else(|err| {
            warn!(error = %err, "failed to render not found page");
            None
        })
        .unwrap_or_else(|| "page not found".to_string());

    let mut builder = HttpResponse::NotFound();
    builder.content_type(ContentType::html());
    if pending.is_some() {
        builder.cookie(flash::removal_cookie());
    }
    let response = builder.body(body);

    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, response).map_into_right_body(),
    ))
}
