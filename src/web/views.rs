use crate::web::error::WebError;
use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("dashboard.html", include_str!("../../templates/dashboard.html")),
    ("pdf.html", include_str!("../../templates/pdf.html")),
    ("textual.html", include_str!("../../templates/textual.html")),
    ("textual_similarity.html", include_str!("../../templates/textual_similarity.html")),
    ("image_index.html", include_str!("../../templates/image_index.html")),
    ("image_upload.html", include_str!("../../templates/image_upload.html")),
    ("image_results.html", include_str!("../../templates/image_results.html")),
    ("video.html", include_str!("../../templates/video.html")),
    ("wallet.html", include_str!("../../templates/wallet.html")),
    ("history.html", include_str!("../../templates/history.html")),
    ("transfer.html", include_str!("../../templates/transfer.html")),
    ("patents.html", include_str!("../../templates/patents.html")),
];

/// 編譯進執行檔的 minijinja 樣板
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        env.add_filter("percent", percent);
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<Html<String>, WebError> {
        let template = self.env.get_template(name)?;
        Ok(Html(template.render(context)?))
    }
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}
