use super::IMessageRenderer;
use anyhow::{bail, Context};
use minijinja::Environment;
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

const DEFAULT_TEMPLATE: &str = include_str!("../../templates/reminder.html");

/// Values available to the reminder template. Variables the template
/// references but this context lacks render as empty text.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReminderMessage {
    pub plex_username: String,
    pub media_type: String,
    pub title: String,
    pub time_since_text: String,
    pub plex_url: String,
    pub poster_url: String,
    pub mobile_url: String,
    pub request_url: String,
    pub admin_name: String,
}

/// Renders reminders from the operator supplied template when present and
/// from the bundled one otherwise
pub struct TemplateRenderer {
    custom_path: Option<PathBuf>,
}

impl TemplateRenderer {
    pub fn new(custom_path: Option<PathBuf>) -> Self {
        Self { custom_path }
    }

    fn source(&self) -> anyhow::Result<String> {
        let path = match &self.custom_path {
            Some(path) if path.exists() => path,
            Some(path) => {
                warn!(
                    "Email template {} does not exist, using the bundled one",
                    path.display()
                );
                return Ok(DEFAULT_TEMPLATE.to_string());
            }
            None => return Ok(DEFAULT_TEMPLATE.to_string()),
        };
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to load email template {}", path.display()))?;
        if source.trim().is_empty() {
            bail!("Email template {} is empty", path.display());
        }
        Ok(source)
    }
}

impl IMessageRenderer for TemplateRenderer {
    fn render(&self, message: &ReminderMessage) -> anyhow::Result<String> {
        let source = self.source()?;
        let env = Environment::new();
        let template = env
            .template_from_str(&source)
            .context("Email template compilation failed")?;
        template
            .render(message)
            .context("Email template rendering failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> ReminderMessage {
        ReminderMessage {
            plex_username: "neo".into(),
            media_type: "movie".into(),
            title: "The Matrix & Friends".into(),
            time_since_text: "3 months".into(),
            plex_url: "https://plex.example.com/web".into(),
            admin_name: "Morpheus".into(),
            ..Default::default()
        }
    }

    #[test]
    fn renders_bundled_template() {
        let body = TemplateRenderer::new(None).render(&message()).unwrap();
        assert!(body.contains("Hi neo,"));
        assert!(body.contains("<strong>The Matrix & Friends</strong>"));
        assert!(body.contains("https://plex.example.com/web"));
        assert!(body.contains("Morpheus"));
        assert!(!body.contains("Open it in the app"));
    }

    #[test]
    fn custom_template_with_unknown_variables_renders_them_empty() {
        let path = std::env::temp_dir().join(format!(
            "reelminder-template-{}.html",
            std::process::id()
        ));
        std::fs::write(&path, "{{ title }}|{{ missing_value }}|{{ admin_name }}").unwrap();
        let body = TemplateRenderer::new(Some(path.clone()))
            .render(&message())
            .unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(body, "The Matrix & Friends||Morpheus");
    }

    #[test]
    fn missing_custom_template_falls_back() {
        let renderer = TemplateRenderer::new(Some(PathBuf::from("/nonexistent/reminder.html")));
        assert!(renderer.render(&message()).unwrap().contains("Hi neo,"));
    }

    #[test]
    fn broken_template_is_an_error() {
        let path = std::env::temp_dir().join(format!(
            "reelminder-broken-{}.html",
            std::process::id()
        ));
        std::fs::write(&path, "{% if title %}never closed").unwrap();
        let res = TemplateRenderer::new(Some(path.clone())).render(&message());
        std::fs::remove_file(&path).unwrap();
        assert!(res.is_err());
    }
}
