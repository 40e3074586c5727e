//! Development server with dashboard API and live reload

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use crate::content::{ContentSource, ContentStore, MarkdownCompiler, PostResolver};
use crate::stats::TreeStatsAggregator;
use crate::Docpress;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    app: Docpress,
    resolver: PostResolver,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Start the development server.
///
/// With `snapshot`, the whole content tree is read into a
/// `ContentStore` before the listener binds and pages are served from
/// memory for the life of the process. Otherwise pages are read from
/// disk per request, so edits show up without a restart.
pub async fn start(
    app: &Docpress,
    ip: &str,
    port: u16,
    watch: bool,
    open: bool,
    snapshot: bool,
) -> Result<()> {
    let source = if snapshot {
        let store = ContentStore::build(&app.pages_dir)?;
        tracing::info!("Built content snapshot with {} documents", store.len());
        ContentSource::snapshot(store)
    } else {
        ContentSource::filesystem(&app.pages_dir)
    };

    let resolver = PostResolver::new(source, MarkdownCompiler::with_options(&app.config.highlight));

    // Snapshot content never changes, so there is nothing to watch
    let watch = watch && !snapshot;

    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        app: app.clone(),
        resolver,
        reload_tx: reload_tx.clone(),
        live_reload: watch,
    });

    let router = Router::new()
        .route("/api/dashboard", get(dashboard_handler))
        .route("/api/ls", post(ls_handler))
        .route("/api/page/*id", get(page_handler))
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .with_state(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Dashboard running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let pages_dir = app.pages_dir.clone();
        tokio::spawn(async move {
            if let Err(e) = watch_and_reload(pages_dir, reload_tx).await {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Watch the content tree and notify connected clients on changes.
///
/// Filesystem mode re-reads pages per request, so there is no rebuild
/// step here; a change only needs to push a reload signal.
async fn watch_and_reload(pages_dir: PathBuf, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Debounce editor save bursts into a single reload
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if pages_dir.exists() {
        debouncer
            .watcher()
            .watch(&pages_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", pages_dir);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant_events: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".git")
                            && !path_str.contains(".DS_Store")
                            && !path_str.contains("node_modules")
                            && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant_events.is_empty() {
                    continue;
                }

                for event in &relevant_events {
                    tracing::info!("Content changed: {}", event.path.display());
                }

                let _ = reload_tx.send(());
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Dashboard payload: stats, workdir, theme, optional features
async fn dashboard_handler(State(state): State<Arc<ServerState>>) -> Response {
    let stats = TreeStatsAggregator::new(&state.app.pages_dir).compute();

    Json(json!({
        "type": "success",
        "data": {
            "stats": stats,
            "workdir": state.app.base_dir.display().to_string(),
            "theme": theme_name(&state.app.theme_dir),
            "features": detect_features(&state.app.base_dir),
        }
    }))
    .into_response()
}

/// Directory listing request body
#[derive(Deserialize)]
struct LsRequest {
    path: Option<String>,
    pwd: Option<String>,
}

#[derive(Serialize)]
struct DirListing {
    folders: Vec<String>,
    files: Vec<String>,
    pwd: String,
    root: bool,
}

/// Directory listing for the dashboard file browser
async fn ls_handler(
    State(_state): State<Arc<ServerState>>,
    Json(req): Json<LsRequest>,
) -> Response {
    let path = match req.path {
        Some(path) => path,
        None => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "type": "error",
                    "msg": "path is missing from request body",
                })),
            )
                .into_response();
        }
    };

    match list_dir(&path, req.pwd.as_deref()) {
        Some(listing) => Json(json!({
            "type": "success",
            "folders": listing.folders,
            "files": listing.files,
            "pwd": listing.pwd,
            "root": listing.root,
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "type": "error",
                "msg": "folder doesn't exist",
            })),
        )
            .into_response(),
    }
}

/// List a directory, folders and files separated and sorted by name
fn list_dir(path: &str, pwd: Option<&str>) -> Option<DirListing> {
    let end_path = match pwd {
        Some(pwd) => Path::new(pwd).join(path),
        None => PathBuf::from(path),
    };

    if !end_path.is_dir() {
        return None;
    }

    let mut folders = Vec::new();
    let mut files = Vec::new();

    for entry in fs::read_dir(&end_path).ok()?.filter_map(|e| e.ok()) {
        let name = entry.file_name().to_string_lossy().to_string();
        match entry.file_type() {
            Ok(t) if t.is_dir() => folders.push(name),
            Ok(t) if t.is_file() => files.push(name),
            _ => {}
        }
    }

    folders.sort();
    files.sort();

    let pwd = fs::canonicalize(&end_path).unwrap_or(end_path);
    let root = pwd.parent().is_none();

    Some(DirListing {
        folders,
        files,
        pwd: pwd.display().to_string(),
        root,
    })
}

/// Resolve and return one page as `{body, meta}`
async fn page_handler(
    State(state): State<Arc<ServerState>>,
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Response {
    let id = id.trim_matches('/');

    match state.resolver.resolve(id) {
        Ok(page) => Json(json!({
            "body": page.body,
            "meta": page.metadata,
        }))
        .into_response(),
        Err(e) if e.is_not_found() => (
            StatusCode::NOT_FOUND,
            Json(json!({ "type": "error", "status": 404 })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to render page {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "type": "error", "status": 500 })),
            )
                .into_response()
        }
    }
}

/// Theme name from the theme's package metadata, or "Unknown"
fn theme_name(theme_dir: &Path) -> String {
    let meta_path = theme_dir.join("meta").join("package.json");

    let content = match fs::read_to_string(&meta_path) {
        Ok(content) => content,
        Err(_) => return "Unknown".to_string(),
    };

    let meta: serde_json::Value = match serde_json::from_str(&content) {
        Ok(meta) => meta,
        Err(_) => return "Unknown".to_string(),
    };

    match meta.get("name").and_then(|n| n.as_str()) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "Unknown".to_string(),
    }
}

/// Optional site features detected from the working directory
#[derive(Serialize)]
struct Features {
    ui: bool,
    pandoc: bool,
}

fn detect_features(base_dir: &Path) -> Features {
    Features {
        ui: base_dir.join("ui").is_dir(),
        pandoc: base_dir.join("pandoc").is_dir(),
    }
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve the static dashboard UI, injecting the live reload script into HTML
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let decoded = percent_decode_str(request.uri().path()).decode_utf8_lossy();
    let clean_path = decoded.trim_start_matches('/');

    // Keep lookups inside the UI directory
    if Path::new(clean_path)
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    let file_path = if clean_path.is_empty() {
        state.app.ui_dir.join("index.html")
    } else {
        let candidate = state.app.ui_dir.join(clean_path);
        if candidate.is_dir() {
            candidate.join("index.html")
        } else {
            candidate
        }
    };

    let is_html = file_path
        .extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false);

    if is_html && state.live_reload {
        match tokio::fs::read_to_string(&file_path).await {
            Ok(content) => Html(inject_live_reload(&content)).into_response(),
            Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        }
    } else {
        let mut service = ServeDir::new(&state.app.ui_dir).append_index_html_on_directories(true);
        match service.try_call(request).await {
            Ok(response) => response.into_response(),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
        }
    }
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
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
