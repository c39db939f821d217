use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};
use log::{error, info, warn, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Root};
use rust_exercise_scraper::app_state::AppState;
use rust_exercise_scraper::catalog::{match_muscle, render_format, supported_muscles};
use rust_exercise_scraper::config::Config;
use rust_exercise_scraper::tools::ToolError;
use serde_json::{json, Value};

#[get("/muscles")]
async fn list_muscles() -> impl Responder {
    HttpResponse::Ok().json(supported_muscles())
}

#[get("/format")]
async fn get_format() -> impl Responder {
    HttpResponse::Ok().json(render_format())
}

#[get("/exercises/{gender}/{muscle}")]
async fn get_exercises(data: web::Data<AppState>, path: web::Path<(String, String)>) -> impl Responder {
    let (gender, muscle) = path.into_inner();
    if match_muscle(&muscle).is_none() {
        warn!("Muscle '{}' is not in the supported list; scraping anyway", muscle);
    }

    match data.orchestrator.fetch_exercises(&muscle, &gender).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            error!("Failed to fetch exercises for {} ({}): {}", muscle, gender, e);
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}

#[get("/tools")]
async fn list_tools(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.tools.list())
}

#[post("/tools/{name}")]
async fn invoke_tool(
    data: web::Data<AppState>,
    name: web::Path<String>,
    body: Option<web::Json<Value>>,
) -> impl Responder {
    let args = body.map(web::Json::into_inner).unwrap_or_else(|| json!({}));

    match data.tools.invoke(&name, args).await {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e @ ToolError::UnknownTool(_)) => HttpResponse::NotFound().json(json!({ "error": e.to_string() })),
        Err(e @ ToolError::InvalidArguments(_)) => {
            HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))
        }
        Err(e) => {
            error!("Tool {} failed: {}", name, e);
            HttpResponse::BadGateway().json(json!({ "error": e.to_string() }))
        }
    }
}

#[get("/metrics")]
async fn get_metrics(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.metrics.get_all_metrics())
}

fn init_logging() {
    if log4rs::init_file("log4rs.yml", Default::default()).is_ok() {
        return;
    }

    let stdout = ConsoleAppender::builder().build();
    let fallback = log4rs::config::Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));

    match fallback {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                eprintln!("Logging unavailable: {}", e);
            }
        }
        Err(e) => eprintln!("Logging unavailable: {}", e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let cfg = Config::load();
    info!("Catalog: {}", cfg.catalog.base_url);
    info!("  Headless: {}", cfg.browser.headless);
    info!("  Navigation timeout: {}s", cfg.browser.navigation_timeout_secs);
    info!(
        "  Scroll: {} rounds x {}px, stop after {} idle",
        cfg.collector.max_rounds, cfg.collector.scroll_step_px, cfg.collector.max_idle_rounds
    );

    let host = cfg.server.host.clone();
    let (port_start, port_end) = (cfg.server.port_start, cfg.server.port_end);
    let data = web::Data::new(AppState::new(cfg));

    // Try to bind to an available port in the configured range
    let mut last_err: Option<std::io::Error> = None;
    for port in port_start..=port_end {
        let data_clone = data.clone();
        let addr = format!("{}:{}", host, port);
        match HttpServer::new(move || {
            App::new()
                .app_data(data_clone.clone())
                .service(list_muscles)
                .service(get_format)
                .service(get_exercises)
                .service(list_tools)
                .service(invoke_tool)
                .service(get_metrics)
        })
        .bind(&addr)
        {
            Ok(server) => {
                info!("Listening on http://{}", addr);
                return server.run().await;
            }
            Err(e) => {
                warn!("Port {} unavailable: {}", port, e);
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::AddrNotAvailable, "empty port range")
    }))
}
