//! Preview server that decorates pages as they are requested

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    Router,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::bootstrap::Bootstrapper;
use crate::Site;

/// Server state
struct ServerState {
    public_dir: PathBuf,
    bootstrapper: Bootstrapper,
}

/// Build the router serving `site`
pub fn router(site: &Site) -> Result<Router> {
    let bootstrapper = site.bootstrapper()?;
    tracing::debug!("Registered blocks: {:?}", bootstrapper.registry().kinds());

    let state = Arc::new(ServerState {
        public_dir: site.public_dir.clone(),
        bootstrapper,
    });

    Ok(Router::new()
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the preview server
pub async fn start(site: &Site, ip: &str, port: u16, open: bool) -> Result<()> {
    let app = router(site)?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve files, decorating HTML pages on the way out
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let file_path = resolve_path(&state.public_dir, request.uri().path());

    let is_html = file_path
        .extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false);

    if is_html {
        match tokio::fs::read_to_string(&file_path).await {
            Ok(content) => {
                let (decorated, report) = state.bootstrapper.decorate_html(&content).await;
                tracing::debug!(
                    "Served {:?}: {} enhanced, {} failed",
                    file_path,
                    report.enhanced(),
                    report.failed()
                );
                Html(decorated).into_response()
            }
            Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        }
    } else {
        // Serve static file using tower-http
        let mut service = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);
        match service.try_call(request).await {
            Ok(response) => response.into_response(),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
        }
    }
}

/// Map a request path to a file under the public directory
fn resolve_path(public_dir: &Path, path: &str) -> PathBuf {
    if path == "/" {
        return public_dir.join("index.html");
    }

    let clean_path = path.trim_start_matches('/');
    if clean_path.split('/').any(|segment| segment == "..") {
        return public_dir.join("__not_found__");
    }

    let candidate = public_dir.join(clean_path);

    // If it's a directory, look for index.html
    if candidate.is_dir() {
        candidate.join("index.html")
    } else if candidate.exists() {
        candidate
    } else {
        // Try adding .html extension
        let with_html = public_dir.join(format!("{}.html", clean_path.trim_end_matches('/')));
        if with_html.exists() {
            with_html
        } else {
            candidate
        }
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const PAGE: &str = r#"<html><head></head><body><main><div><div class="posts"><p>Loading</p></div></div></main><footer></footer></body></html>"#;

    fn site_with_pages() -> (TempDir, Site) {
        let temp = TempDir::new().unwrap();
        let public = temp.path().join("public");
        fs::create_dir_all(&public).unwrap();
        fs::write(public.join("index.html"), PAGE).unwrap();
        fs::write(public.join("style.css"), "body {}").unwrap();
        fs::write(
            public.join("query-index.json"),
            r#"{"data": [{"path": "/posts/hello", "title": "Hello", "date": "2025-12-05"}]}"#,
        )
        .unwrap();
        let site = Site::new(temp.path()).unwrap();
        (temp, site)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_pages_are_decorated_per_request() {
        let (_temp, site) = site_with_pages();
        let app = router(&site).unwrap();

        let response = app.clone().oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"<link rel="stylesheet" href="/blocks/posts/posts.css">"#));
        assert!(html.contains(r#"<h3><a href="/posts/hello">Hello</a></h3>"#));
        assert!(html.contains("John Doe"));
        assert!(!html.contains("Loading"));

        // The page on disk is never rewritten
        let on_disk = fs::read_to_string(site.public_dir.join("index.html")).unwrap();
        assert_eq!(on_disk, PAGE);
    }

    #[tokio::test]
    async fn test_static_files_and_missing_pages() {
        let (_temp, site) = site_with_pages();
        let app = router(&site).unwrap();

        let response = app.clone().oneshot(get("/style.css")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "body {}");

        let response = app.oneshot(get("/missing.html")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_resolve_path() {
        let temp = TempDir::new().unwrap();
        let public = temp.path();
        fs::create_dir_all(public.join("posts")).unwrap();
        fs::write(public.join("posts/index.html"), "").unwrap();
        fs::write(public.join("about.html"), "").unwrap();

        assert_eq!(resolve_path(public, "/"), public.join("index.html"));
        assert_eq!(resolve_path(public, "/posts/"), public.join("posts/index.html"));
        assert_eq!(resolve_path(public, "/about"), public.join("about.html"));
        assert_eq!(resolve_path(public, "/missing.css"), public.join("missing.css"));
        assert!(!resolve_path(public, "/../secret").starts_with(public.join("..")));
    }
}
