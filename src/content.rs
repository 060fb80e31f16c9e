//! The Content Responder: index page, blog page, static files and the 404 page.
//!
//! Everything is read from the site root on each request, so edits to pages,
//! templates and `db/data.json` show up without a restart.
//!
//! ```text
//! site/
//! ├── index.html
//! ├── error.html
//! ├── templates/blog.jinja
//! └── db/data.json
//! ```

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use minijinja::{Environment, context};
use tracing::{error, warn};

use crate::error::Result;
use crate::request::Request;
use crate::response::{ContentType, Response};
use crate::status::Status;

const INDEX_PAGE: &str = "index.html";
const ERROR_PAGE: &str = "error.html";
const BLOG_TEMPLATE: &str = "templates/blog.jinja";
const BLOG_DATA: &str = "db/data.json";

pub struct Site {
    root: PathBuf,
}

impl Site {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `GET /`
    pub async fn index(self: Arc<Self>, _req: Request) -> Response {
        match tokio::fs::read(self.root.join(INDEX_PAGE)).await {
            Ok(body) => Response::html(body),
            Err(e) => {
                error!(root = %self.root.display(), "cannot read {INDEX_PAGE}: {e}");
                Response::status(Status::InternalServerError)
            }
        }
    }

    /// `GET /blog`: the blog template rendered with `posts` from the JSON file.
    pub async fn blog(self: Arc<Self>, _req: Request) -> Response {
        match self.render_blog().await {
            Ok(html) => Response::html(html),
            Err(e) => {
                error!(root = %self.root.display(), "cannot render blog: {e}");
                Response::status(Status::InternalServerError)
            }
        }
    }

    async fn render_blog(&self) -> Result<String> {
        let data = tokio::fs::read_to_string(self.root.join(BLOG_DATA)).await?;
        let posts: serde_json::Value = serde_json::from_str(&data)?;
        let source = tokio::fs::read_to_string(self.root.join(BLOG_TEMPLATE)).await?;

        let mut env = Environment::new();
        env.add_template("blog", &source)?;
        let html = env.get_template("blog")?.render(context! { posts => posts })?;
        Ok(html)
    }

    /// `GET <path>`: the file under the site root, or the 404 page.
    pub async fn static_file(self: Arc<Self>, req: Request) -> Response {
        let Some(file) = self.resolve(req.path()) else {
            return self.not_found().await;
        };
        let is_file = tokio::fs::metadata(&file).await.is_ok_and(|m| m.is_file());
        if !is_file {
            return self.not_found().await;
        }

        match tokio::fs::read(&file).await {
            Ok(body) => Response::builder().bytes(ContentType::from_path(&file), body),
            Err(e) => {
                error!(file = %file.display(), "cannot read static file: {e}");
                Response::status(Status::InternalServerError)
            }
        }
    }

    /// The error page with status 404, or a plain-text 404 if the page is missing.
    pub async fn not_found(&self) -> Response {
        match tokio::fs::read(self.root.join(ERROR_PAGE)).await {
            Ok(body) => Response::builder()
                .status(Status::NotFound)
                .bytes(ContentType::Html, body),
            Err(e) => {
                warn!(root = %self.root.display(), "cannot read {ERROR_PAGE}: {e}");
                Response::builder().status(Status::NotFound).text("not found")
            }
        }
    }

    /// Maps a URL path onto the site root. `..`, root and prefix components
    /// resolve to nothing.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return None;
        }
        let escapes = relative.components().any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        (!escapes).then(|| self.root.join(relative))
    }
}
