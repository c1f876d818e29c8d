use minijinja::{context, Environment, Value};
use tracing::error;

use crate::ui::Screen;
use crate::views::results::NO_RESULTS_TEXT;

pub fn init_templates() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();

    env.add_template("results.txt", include_str!("../../templates/results.txt"))?;
    env.add_template("catalog.txt", include_str!("../../templates/catalog.txt"))?;

    Ok(env)
}

pub fn render_template(env: &Environment, template_name: &str, context: Value) -> String {
    match env.get_template(template_name) {
        Ok(tmpl) => match tmpl.render(context) {
            Ok(result) => result,
            Err(e) => {
                error!("Template render error: {}", e);
                format!("[template error: {}]", e)
            }
        },
        Err(e) => {
            error!("Template not found: {} ({})", template_name, e);
            format!("[template not found: {}]", template_name)
        }
    }
}

/// Text for the catalog (with pending notices) followed by the results panel.
pub fn render_screen(env: &Environment, screen: &Screen) -> String {
    let catalog = render_template(
        env,
        "catalog.txt",
        context! { catalog => &screen.catalog, notices => &screen.notices },
    );
    let results = render_template(
        env,
        "results.txt",
        context! { results => &screen.results, no_results => NO_RESULTS_TEXT },
    );
    format!("{}\n{}", catalog.trim_end(), results.trim_end())
}
