//! Demo application
//!
//! Serves `public/`, echoes words from the url and mounts a small `/api`
//! router with nested sub-routers.

use serde_json::json;
use treeroute::{handler, logger, App, Config, Exchange, Handler, Next, Route, Router};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path_from_args();
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Tokio runtime, worker threads from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async {
        let mut app = App::new(cfg);
        app.static_dir("public");
        build_routes(app.router());
        app.listen().await
    })?;

    Ok(())
}

/// `--config <path>` (without extension), `config` by default
fn config_path_from_args() -> String {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return path;
            }
        } else if let Some(path) = arg.strip_prefix("--config=") {
            return path.to_string();
        }
    }
    "config".to_string()
}

fn build_routes(router: &mut Router) {
    router
        .attach(body_log())
        .any(
            "/",
            handler(|mut ex: Exchange, _| async move {
                if !ex.response.send_file("./public/index.html").await {
                    ex.response.status(404).send_text("index.html is missing");
                }
                ex
            }),
        )
        .all("echo", handler(echo))
        .post(
            "form",
            handler(|mut ex: Exchange, _| async move {
                let body = ex.request.body().cloned().unwrap_or_else(|| json!({}));
                ex.response.send_text(format!("you sent: {body}"));
                ex
            }),
        )
        .any("/api", api_router());
}

async fn echo(mut ex: Exchange, _next: Next) -> Exchange {
    let words: Vec<&str> = ex
        .request
        .path()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .skip(1)
        .collect();

    if words.is_empty() {
        ex.response
            .send_json(&json!({ "message": "Append text to the url to make me say stuff!" }));
        return ex;
    }

    let message = words.join(" ").replace("%20", " ").replace('+', " ");
    if message.eq_ignore_ascii_case("hello world") {
        ex.response.send_text("Come on! That's too easy.");
    } else {
        ex.response.send_text(message);
    }
    ex
}

/// Logs the parsed body of every non-GET request
fn body_log() -> Handler {
    handler(|ex: Exchange, next: Next| async move {
        if ex.request.method() != treeroute::Method::Get {
            logger::log_info(&format!(
                "{} {}",
                ex.request.url(),
                ex.request.body().map_or_else(|| "null".to_string(), ToString::to_string)
            ));
        }
        next.run(ex).await
    })
}

fn api_router() -> Router {
    let mut api = Router::new();
    api.get(
        "/",
        Route::chain(vec![
            handler(|mut ex: Exchange, next: Next| async move {
                ex.response.set_header("middleware-active", "true");
                next.run(ex).await
            }),
            handler(|mut ex: Exchange, _| async move {
                ex.response.send_text("API ROUTE");
                ex
            }),
        ]),
    )
    .get(
        "/health",
        handler(|mut ex: Exchange, _| async move {
            ex.response
                .send_json(&json!({ "message": "As you can see, I'm healthy" }));
            ex
        }),
    )
    .post(
        "/form",
        handler(|mut ex: Exchange, _| async move {
            let body = ex.request.body().cloned().unwrap_or_else(|| json!({}));
            ex.response.send_text(format!("you sent: {body}"));
            ex
        }),
    )
    .get(
        "/query",
        handler(|mut ex: Exchange, _| async move {
            let query = ex.request.query().clone();
            ex.response.send_json(&query);
            ex
        }),
    );

    let mut deeper = Router::new();
    deeper.any(
        "/deepest",
        handler(|mut ex: Exchange, _| async move {
            ex.response
                .send_json(&json!({ "alert": "This is the deepest router" }));
            ex
        }),
    );
    let mut deep = Router::new();
    deep.any("/deeper", deeper);
    api.any("/deep", deep);

    let mut catch_all = Router::new();
    catch_all.all(
        "/",
        handler(|mut ex: Exchange, _| async move {
            ex.response.send_text("DEEP");
            ex
        }),
    );
    api.all(
        "/all",
        Route::mount(catch_all).middleware(handler(|mut ex: Exchange, next: Next| async move {
            ex.response.set_header("middleware-active", "true");
            next.run(ex).await
        })),
    );

    api
}
