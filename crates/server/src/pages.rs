use std::path::Path;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

/// Route → file under the pages directory.
pub const PAGES: [(&str, &str); 4] = [
    ("/", "index.html"),
    ("/issue", "issue.html"),
    ("/warranty", "warranty.html"),
    ("/terms", "tnc.html"),
];

pub fn router(pages_dir: &Path, static_dir: &Path) -> Router {
    let pages = PAGES.iter().fold(Router::new(), |router, (route, file)| {
        router.route_service(route, ServeFile::new(pages_dir.join(file)))
    });

    pages.nest_service("/static", ServeDir::new(static_dir))
}
