//! HTTP server for the dashboard
//!
//! `topicmap` → loads the dataset, starts server, serves the page and API
//!
//! Requests are handled one at a time on the calling thread. Each one is
//! routed by [`route`], a pure function from request parts to a [`Reply`],
//! so routing is testable without a socket.

use crate::context::AppContext;
use crate::controller::{dispatch, UiEvent, UiFragment, ViewState};
use crate::data::TopicId;
use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, info, warn};

// Embed the UI directly in the binary
const UI_HTML: &str = include_str!("ui.html");

/// Largest accepted request body; events are a few hundred bytes
const MAX_BODY: u64 = 64 * 1024;

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    fn failure(error: impl Into<String>) -> Self {
        Self { ok: false, data: None, error: Some(error.into()) }
    }
}

/// Body of `POST /api/event`
#[derive(Deserialize, Debug)]
pub struct EventRequest {
    pub event: UiEvent,
    #[serde(default)]
    pub view: ViewState,
}

#[derive(Deserialize, Debug)]
struct FigureParams {
    /// Slider step; absent means the initial, everything-visible figure
    step: Option<i64>,
}

#[derive(Deserialize, Debug)]
struct HoverParams {
    topic: Option<i64>,
}

/// Where to listen
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub host: String,
    pub port: u16,
    /// Open the page in the default browser once listening
    pub open_browser: bool,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8050,
            open_browser: false,
        }
    }
}

/// A routed response, not yet written to the socket
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn html(body: String) -> Self {
        Self { status: 200, content_type: "text/html; charset=utf-8", body }
    }

    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self { status, content_type: "application/json", body },
            Err(e) => Self {
                status: 500,
                content_type: "text/plain; charset=utf-8",
                body: format!("serialization failed: {}", e),
            },
        }
    }

    fn fragment(fragment: UiFragment) -> Self {
        Self::json(200, &ApiResponse::success(fragment))
    }

    fn bad_request(error: impl Into<String>) -> Self {
        Self::json(400, &ApiResponse::<()>::failure(error))
    }

    fn too_large() -> Self {
        Self::json(413, &ApiResponse::<()>::failure(format!("body exceeds {} bytes", MAX_BODY)))
    }

    fn not_found() -> Self {
        Self { status: 404, content_type: "text/plain; charset=utf-8", body: "Not found".to_string() }
    }
}

/// Start server, optionally open browser, serve until the process stops
pub fn start(ctx: &AppContext, options: &ServeOptions) -> io::Result<()> {
    let addr = format!("{}:{}", options.host, options.port);
    let server = Server::http(&addr).map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    let url = format!("http://localhost:{}", options.port);

    eprintln!("\n\x1b[1;32m🗺  topicmap\x1b[0m");
    eprintln!("   {}", url);
    eprintln!(
        "   {} points, {} topics, {} descriptions\n",
        ctx.dataset.points().len(),
        ctx.colors.len(),
        ctx.dataset.descriptions().len()
    );
    info!(%addr, "listening");

    if options.open_browser {
        if let Err(e) = open::that(&url) {
            warn!(error = %e, "could not open browser");
        }
    }

    // Handle requests
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, ctx) {
            warn!(error = %e, "failed to answer request");
        }
    }

    Ok(())
}

fn handle_request(mut request: Request, ctx: &AppContext) -> io::Result<()> {
    let method = request.method().clone();
    let url = request.url().to_string();

    let body = if method == Method::Post {
        read_body(request.as_reader())
    } else {
        Ok(String::new())
    };

    let reply = match body {
        Ok(body) => route(ctx, &method, &url, &body),
        Err(reply) => reply,
    };
    debug!(?method, %url, status = reply.status, "request");

    let response = Response::from_string(reply.body)
        .with_status_code(reply.status)
        .with_header(content_type(reply.content_type));
    request.respond(response)
}

/// Read at most [`MAX_BODY`] bytes of UTF-8, or the reply refusing it
fn read_body(reader: impl Read) -> Result<String, Reply> {
    let mut bytes = Vec::new();
    reader
        .take(MAX_BODY + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| Reply::bad_request(format!("could not read body: {}", e)))?;
    if bytes.len() as u64 > MAX_BODY {
        return Err(Reply::too_large());
    }
    String::from_utf8(bytes).map_err(|_| Reply::bad_request("invalid event: body is not UTF-8"))
}

fn content_type(value: &'static str) -> Header {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes()).expect("static header is valid ASCII")
}

/// Map one request to its reply
pub fn route(ctx: &AppContext, method: &Method, url: &str, body: &str) -> Reply {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));

    match (method, path) {
        // Serve embedded UI
        (&Method::Get, "/") => Reply::html(render_page(ctx)),

        // API: slider bounds and marks
        (&Method::Get, "/api/slider") => Reply::json(200, &ApiResponse::success(&ctx.slider)),

        // API: one UI event with the page's view state
        (&Method::Post, "/api/event") => match serde_json::from_str::<EventRequest>(body) {
            Ok(req) => Reply::fragment(dispatch(ctx, &req.event, &req.view)),
            Err(e) => Reply::bad_request(format!("invalid event: {}", e)),
        },

        // API: figure at a slider step, no view state
        (&Method::Get, "/api/figure") => match serde_urlencoded::from_str::<FigureParams>(query) {
            Ok(FigureParams { step }) => {
                let event = match step {
                    Some(step) => UiEvent::DateSlider { step },
                    None => UiEvent::Initial,
                };
                Reply::fragment(dispatch(ctx, &event, &ViewState::default()))
            }
            Err(e) => Reply::bad_request(format!("invalid query: {}", e)),
        },

        // API: description for a topic
        (&Method::Get, "/api/hover") => match serde_urlencoded::from_str::<HoverParams>(query) {
            Ok(params) => Reply::fragment(dispatch(
                ctx,
                &UiEvent::Hover { topic: params.topic.map(TopicId) },
                &ViewState::default(),
            )),
            Err(e) => Reply::bad_request(format!("invalid query: {}", e)),
        },

        // 404
        _ => Reply::not_found(),
    }
}

/// The page with the slider configuration inlined
fn render_page(ctx: &AppContext) -> String {
    // Keep "</" out of the inline script
    let slider = serde_json::to_string(&ctx.slider)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/");
    UI_HTML.replace("{{SLIDER_CONFIG}}", &slider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hover::{HOVER_PROMPT, NO_DESCRIPTION};
    use crate::testing::{sample_dataset, utc};
    use serde_json::Value;

    fn ctx() -> AppContext {
        AppContext::new(sample_dataset(), "Topics")
    }

    fn json(reply: &Reply) -> Value {
        assert_eq!(reply.content_type, "application/json");
        serde_json::from_str(&reply.body).unwrap()
    }

    // ==========================================================================
    // PAGE TESTS
    // ==========================================================================

    #[test]
    fn test_index_serves_page_with_slider() {
        let reply = route(&ctx(), &Method::Get, "/", "");
        assert_eq!(reply.status, 200);
        assert!(reply.content_type.starts_with("text/html"));
        assert!(!reply.body.contains("{{SLIDER_CONFIG}}"));
        assert!(reply.body.contains("\"step\":86400"));
    }

    #[test]
    fn test_page_has_ui_elements() {
        assert!(UI_HTML.contains("id=\"cluster-plot\""));
        assert!(UI_HTML.contains("id=\"date-slider\""));
        assert!(UI_HTML.contains("id=\"hover-description\""));
        assert!(UI_HTML.contains("/api/event"));
        // Steps go to the server as indices, never as precomputed cutoffs
        assert!(UI_HTML.contains("event: 'date_slider', step"));
    }

    #[test]
    fn test_unknown_path_is_404() {
        let reply = route(&ctx(), &Method::Get, "/nope", "");
        assert_eq!(reply.status, 404);

        let reply = route(&ctx(), &Method::Delete, "/", "");
        assert_eq!(reply.status, 404);
    }

    // ==========================================================================
    // API TESTS
    // ==========================================================================

    #[test]
    fn test_slider_endpoint() {
        let reply = route(&ctx(), &Method::Get, "/api/slider", "");
        let body = json(&reply);
        assert_eq!(body["ok"], true);
        assert_eq!(body["data"]["min"], utc(2023, 4, 17).timestamp());
        assert_eq!(body["data"]["marks"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_event_endpoint_slider_keeps_viewport() {
        let body = r#"{"event":{"event":"date_slider","step":45},"view":{"x_range":[0,10],"y_range":[0,5]}}"#;
        let reply = route(&ctx(), &Method::Post, "/api/event", body);
        assert_eq!(reply.status, 200);

        let body = json(&reply);
        assert_eq!(body["data"]["kind"], "figure");
        let layout = &body["data"]["value"]["layout"];
        assert_eq!(layout["xaxis"]["range"], serde_json::json!([0.0, 10.0]));
        assert_eq!(layout["yaxis"]["range"], serde_json::json!([0.0, 5.0]));
    }

    #[test]
    fn test_event_endpoint_hover() {
        let reply = route(&ctx(), &Method::Post, "/api/event", r#"{"event":{"event":"hover","topic":1}}"#);
        let body = json(&reply);
        assert_eq!(body["data"]["kind"], "description");
        assert_eq!(body["data"]["value"], "Border enforcement and wall funding");
    }

    #[test]
    fn test_event_endpoint_rejects_bad_json() {
        let reply = route(&ctx(), &Method::Post, "/api/event", "{not json");
        assert_eq!(reply.status, 400);
        let body = json(&reply);
        assert_eq!(body["ok"], false);
        assert!(body["error"].as_str().unwrap().starts_with("invalid event"));
    }

    #[test]
    fn test_figure_endpoint() {
        let ctx = ctx();

        let reply = route(&ctx, &Method::Get, "/api/figure", "");
        let all = json(&reply);
        assert_eq!(all["data"]["kind"], "figure");

        // Step 13 is 2023-04-30
        let reply = route(&ctx, &Method::Get, "/api/figure?step=13", "");
        let early = json(&reply);
        let traces = early["data"]["value"]["data"].as_array().unwrap();
        let points: usize = traces.iter().map(|t| t["x"].as_array().unwrap().len()).sum();
        assert_eq!(points, 2);
        assert!(early["data"]["value"]["layout"]["xaxis"].get("range").is_none());
    }

    #[test]
    fn test_figure_endpoint_bad_step() {
        let reply = route(&ctx(), &Method::Get, "/api/figure?step=soon", "");
        assert_eq!(reply.status, 400);
        assert_eq!(json(&reply)["ok"], false);
    }

    #[test]
    fn test_figure_endpoint_step_past_end_shows_everything() {
        let ctx = ctx();
        let url = format!("/api/figure?step={}", i64::MAX);
        let body = json(&route(&ctx, &Method::Get, &url, ""));
        let traces = body["data"]["value"]["data"].as_array().unwrap();
        let points: usize = traces.iter().map(|t| t["x"].as_array().unwrap().len()).sum();
        assert_eq!(points, ctx.dataset.points().len());
    }

    // ==========================================================================
    // BODY TESTS
    // ==========================================================================

    #[test]
    fn test_body_read_as_utf8() {
        let body = read_body(&br#"{"event":{"event":"initial"}}"#[..]).unwrap();
        assert_eq!(body, r#"{"event":{"event":"initial"}}"#);
    }

    #[test]
    fn test_non_utf8_body_is_bad_request() {
        let reply = read_body(&b"{\"event\":{\"event\":\"hover\",\"topic\":\xff}}"[..]).unwrap_err();
        assert_eq!(reply.status, 400);
        let body = json(&reply);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "invalid event: body is not UTF-8");
    }

    #[test]
    fn test_oversized_body_is_refused() {
        let big = vec![b' '; MAX_BODY as usize + 1];
        let reply = read_body(&big[..]).unwrap_err();
        assert_eq!(reply.status, 413);
        assert_eq!(json(&reply)["ok"], false);

        let limit = vec![b' '; MAX_BODY as usize];
        assert_eq!(read_body(&limit[..]).unwrap().len(), MAX_BODY as usize);
    }

    #[test]
    fn test_hover_endpoint() {
        let ctx = ctx();

        let body = json(&route(&ctx, &Method::Get, "/api/hover?topic=2", ""));
        assert_eq!(body["data"]["value"], "Asylum processing at ports of entry");

        let body = json(&route(&ctx, &Method::Get, "/api/hover?topic=99", ""));
        assert_eq!(body["data"]["value"], NO_DESCRIPTION);

        let body = json(&route(&ctx, &Method::Get, "/api/hover", ""));
        assert_eq!(body["data"]["value"], HOVER_PROMPT);
    }
}
