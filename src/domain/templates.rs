//! Embedded minijinja templates for prompts, fallback sections and reports.

use std::sync::OnceLock;

use include_dir::{Dir, DirEntry, include_dir};
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;

use crate::domain::AppError;

static TEMPLATES_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/assets/templates");

static ENV: OnceLock<Environment<'static>> = OnceLock::new();

fn environment() -> &'static Environment<'static> {
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_auto_escape_callback(|name| {
            if name.ends_with(".html.j2") { AutoEscape::Html } else { AutoEscape::None }
        });
        register_dir(&mut env, &TEMPLATES_DIR);
        env
    })
}

fn register_dir(env: &mut Environment<'static>, dir: &'static Dir<'static>) {
    for entry in dir.entries() {
        match entry {
            DirEntry::Dir(sub) => register_dir(env, sub),
            DirEntry::File(file) => {
                let (Some(name), Some(source)) = (file.path().to_str(), file.contents_utf8())
                else {
                    continue;
                };
                if let Err(err) = env.add_template(name, source) {
                    tracing::error!(template = name, error = %err, "embedded template is invalid");
                }
            }
        }
    }
}

/// Render an embedded template by its path under `assets/templates`.
pub fn render<S: Serialize>(name: &str, context: S) -> Result<String, AppError> {
    let env = environment();
    let template = env.get_template(name).map_err(|err| render_error(name, err))?;
    template.render(context).map_err(|err| render_error(name, err))
}

/// Names of all embedded templates.
pub fn template_names() -> Vec<String> {
    let mut names: Vec<String> =
        environment().templates().map(|(name, _)| name.to_string()).collect();
    names.sort_unstable();
    names
}

fn render_error(template: &str, err: impl std::fmt::Display) -> AppError {
    AppError::TemplateRender { template: template.to_string(), reason: err.to_string() }
}
