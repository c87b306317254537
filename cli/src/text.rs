use serde::Serialize;
use std::time::Instant;
use tera::{Context, Tera};
use tracing::info;

use records::User;

pub const TITLE: &str = "User Manager";

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub enum FlashKind {
    Success,
    Error,
}

/// One-off message shown above the user table after a form submission.
#[derive(Debug, Serialize, Clone)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, tera::Error> {
        let started = Instant::now();
        let mut tera = Tera::default();
        // Names end in .html so tera autoescapes user supplied values.
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("index.html", include_str!("../templates/index.html")),
        ])?;
        let elapsed = Instant::now() - started;
        info!(?elapsed, "compiled");

        Ok(Self { tera })
    }

    pub fn render_home(&self, users: &[User], flash: Option<&Flash>) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("title", TITLE);
        context.insert("users", users);
        context.insert("flash", &flash);

        self.tera.render("index.html", &context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_renders_the_title_and_users() -> anyhow::Result<()> {
        let renderer = Renderer::new()?;
        let users = vec![User::new("jacob", "1", "Jacob", "Likes <b>bold</b>")];

        let html = renderer.render_home(&users, None)?;

        assert!(html.contains(TITLE));
        assert!(html.contains("jacob"));
        assert!(html.contains("Likes &lt;b&gt;bold&lt;&#x2F;b&gt;"));
        assert!(!html.contains("class=\"flash"));

        Ok(())
    }

    #[test]
    fn it_renders_flash_messages() -> anyhow::Result<()> {
        let renderer = Renderer::new()?;

        let html = renderer.render_home(&[], Some(&Flash::error("User 'ghost' does not exist")))?;

        assert!(html.contains("flash error"));
        assert!(html.contains("does not exist"));

        Ok(())
    }
}
