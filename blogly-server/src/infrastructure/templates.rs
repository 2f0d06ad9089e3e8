use tera::{Context, Tera};

use crate::domain::error::DomainError;

const PAGES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("not_found.html", include_str!("../../templates/not_found.html")),
    ("users/list.html", include_str!("../../templates/users/list.html")),
    ("users/new.html", include_str!("../../templates/users/new.html")),
    ("users/detail.html", include_str!("../../templates/users/detail.html")),
    ("users/edit.html", include_str!("../../templates/users/edit.html")),
    ("posts/new.html", include_str!("../../templates/posts/new.html")),
    ("posts/detail.html", include_str!("../../templates/posts/detail.html")),
    ("posts/edit.html", include_str!("../../templates/posts/edit.html")),
    ("tags/list.html", include_str!("../../templates/tags/list.html")),
    ("tags/new.html", include_str!("../../templates/tags/new.html")),
    ("tags/detail.html", include_str!("../../templates/tags/detail.html")),
    ("tags/edit.html", include_str!("../../templates/tags/edit.html")),
];

#[derive(Clone)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(PAGES.iter().copied())?;
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String, DomainError> {
        self.tera.render(name, context).map_err(DomainError::from)
    }
}
