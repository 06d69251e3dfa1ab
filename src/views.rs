use anyhow::Context as _;
use axum::{http::StatusCode, response::Html};
use serde::Serialize;
use tera::{Context, Tera};
use tracing::error;

/// HTML templates, compiled into the binary.
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> anyhow::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("login.html", include_str!("../templates/login.html")),
            ("register.html", include_str!("../templates/register.html")),
            ("dashboard.html", include_str!("../templates/dashboard.html")),
        ])
        .context("compile templates")?;
        Ok(Self { tera })
    }

    pub fn render<T: Serialize>(
        &self,
        template: &str,
        view: &T,
    ) -> Result<Html<String>, (StatusCode, String)> {
        Context::from_serialize(view)
            .and_then(|ctx| self.tera.render(template, &ctx))
            .map(Html)
            .map_err(|e| {
                error!(error = ?e, template, "template render failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            })
    }
}
