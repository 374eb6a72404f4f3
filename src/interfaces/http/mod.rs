use crate::domain::dashboard_config::ServerConfig;
use crate::domain::error::AppError;
use crate::domain::year_filter::YearFilter;
use crate::interfaces::state::AppState;
use actix_cors::Cors;
use actix_web::{dev::Server, delete, get, post, web, App, HttpResponse, HttpServer, Responder};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

pub mod dto;
pub mod views;

use dto::{UploadRequest, YearQuery};
use views::{
    collect_views, CategoryView, DeletionView, GeographyView, IngestionView, LabelCountView,
    StatusMessage, SummaryView, TopicView, UploadHistoryView, YearTotalView,
};

pub const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub app_state: Arc<AppState>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

#[derive(Serialize)]
struct HealthResponse<'a> {
    status: &'static str,
    table: &'a str,
}

/// Turn a failed operation into the payload the dashboard expects.
///
/// Missing tables and columns are not errors to the viewer: they read as
/// "no data yet" with a 200.
fn error_response(logs: &Mutex<Vec<LogEntry>>, context: &str, err: &AppError) -> HttpResponse {
    if err.is_no_data() {
        add_log(logs, "INFO", "HttpApi", &format!("{}: {}", context, err));
        return HttpResponse::Ok().json(StatusMessage::no_data());
    }

    add_log(logs, "ERROR", "HttpApi", &format!("{}: {}", context, err));
    match err {
        AppError::IngestionFailure(_) | AppError::ValidationError(_) => {
            warn!(error = %err, "{}", context);
            HttpResponse::UnprocessableEntity().json(StatusMessage::error(err.to_string()))
        }
        AppError::ClassifierFailure(_) => {
            error!(error = %err, "{}", context);
            HttpResponse::InternalServerError().json(StatusMessage::error(
                "No se pudo clasificar las áreas temáticas",
            ))
        }
        AppError::NotFound(_) => {
            HttpResponse::NotFound().json(StatusMessage::error(err.to_string()))
        }
        _ => {
            error!(error = %err, "{}", context);
            HttpResponse::InternalServerError().json(StatusMessage::error(err.to_string()))
        }
    }
}

fn year_filter(data: &HttpState, query: &YearQuery) -> Result<YearFilter, HttpResponse> {
    YearFilter::parse(query.year.as_deref())
        .map_err(|e| error_response(&data.logs, "Invalid year filter", &e))
}

#[post("/uploads")]
async fn upload_files(data: web::Data<HttpState>, req: web::Json<UploadRequest>) -> impl Responder {
    let uploads = match req.into_inner().into_uploads() {
        Ok(uploads) => uploads,
        Err(e) => return error_response(&data.logs, "Upload rejected", &e),
    };
    let names = uploads
        .iter()
        .map(|u| u.file_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    add_log(&data.logs, "INFO", "Ingestion", &format!("Ingesting: {}", names));

    match data.app_state.ingestion_use_case.ingest_uploads(uploads).await {
        Ok(report) => {
            add_log(
                &data.logs,
                "INFO",
                "Ingestion",
                &format!(
                    "Loaded {} row(s) from {} file(s) at {}",
                    report.total_rows(),
                    report.files.len(),
                    report.load_timestamp
                ),
            );
            HttpResponse::Ok().json(IngestionView::from(report))
        }
        Err(e) => error_response(&data.logs, "Ingestion failed", &e),
    }
}

#[get("/uploads")]
async fn upload_history(data: web::Data<HttpState>) -> impl Responder {
    match data.app_state.ingestion_use_case.upload_history().await {
        Ok(history) => HttpResponse::Ok().json(collect_views::<_, UploadHistoryView>(history)),
        Err(e) => error_response(&data.logs, "Upload history unavailable", &e),
    }
}

#[delete("/uploads/{source_file}")]
async fn delete_upload(data: web::Data<HttpState>, path: web::Path<String>) -> impl Responder {
    let source_file = path.into_inner();
    match data
        .app_state
        .ingestion_use_case
        .delete_source_file(&source_file)
        .await
    {
        Ok(report) => {
            add_log(
                &data.logs,
                "WARN",
                "Ingestion",
                &format!("Deleted {} row(s) of '{}'", report.rows_deleted, report.source_file),
            );
            HttpResponse::Ok().json(DeletionView::from(report))
        }
        Err(e) => error_response(&data.logs, "Deletion failed", &e),
    }
}

#[get("/years")]
async fn available_years(data: web::Data<HttpState>) -> impl Responder {
    HttpResponse::Ok().json(data.app_state.reporting_use_case.available_years().await)
}

#[get("/years/totals")]
async fn yearly_totals(data: web::Data<HttpState>) -> impl Responder {
    match data.app_state.reporting_use_case.yearly_totals().await {
        Ok(totals) => HttpResponse::Ok().json(collect_views::<_, YearTotalView>(totals)),
        Err(e) => error_response(&data.logs, "Yearly totals unavailable", &e),
    }
}

#[get("/stats/summary")]
async fn summary(data: web::Data<HttpState>, query: web::Query<YearQuery>) -> impl Responder {
    let filter = match year_filter(&data, &query) {
        Ok(filter) => filter,
        Err(resp) => return resp,
    };
    match data.app_state.reporting_use_case.summary(&filter).await {
        Ok(stats) => HttpResponse::Ok().json(SummaryView::from(stats)),
        Err(e) => error_response(&data.logs, "Summary unavailable", &e),
    }
}

#[get("/stats/institutions")]
async fn institutions(data: web::Data<HttpState>, query: web::Query<YearQuery>) -> impl Responder {
    let filter = match year_filter(&data, &query) {
        Ok(filter) => filter,
        Err(resp) => return resp,
    };
    match data.app_state.reporting_use_case.institutions(&filter).await {
        Ok(tally) => HttpResponse::Ok().json(collect_views::<_, LabelCountView>(tally)),
        Err(e) => error_response(&data.logs, "Institution tally unavailable", &e),
    }
}

#[get("/stats/geography")]
async fn geography(data: web::Data<HttpState>, query: web::Query<YearQuery>) -> impl Responder {
    let filter = match year_filter(&data, &query) {
        Ok(filter) => filter,
        Err(resp) => return resp,
    };
    match data.app_state.reporting_use_case.geography(&filter).await {
        Ok(report) => HttpResponse::Ok().json(GeographyView::from(report)),
        Err(e) => error_response(&data.logs, "Geography report unavailable", &e),
    }
}

#[get("/stats/categories")]
async fn categories(data: web::Data<HttpState>, query: web::Query<YearQuery>) -> impl Responder {
    let filter = match year_filter(&data, &query) {
        Ok(filter) => filter,
        Err(resp) => return resp,
    };
    match data.app_state.reporting_use_case.categories(&filter).await {
        Ok(report) => HttpResponse::Ok().json(CategoryView::from(report)),
        Err(e) => error_response(&data.logs, "Category report unavailable", &e),
    }
}

#[get("/stats/topics")]
async fn topics(data: web::Data<HttpState>) -> impl Responder {
    match data.app_state.reporting_use_case.topics().await {
        Ok(tally) => HttpResponse::Ok().json(collect_views::<_, TopicView>(tally)),
        Err(e) => error_response(&data.logs, "Topic classification failed", &e),
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = lock_logs(&data.logs);
    HttpResponse::Ok().json(&*logs)
}

#[get("/health")]
async fn health(data: web::Data<HttpState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        table: data.app_state.layout.table.as_str(),
    })
}

fn lock_logs(logs: &Mutex<Vec<LogEntry>>) -> std::sync::MutexGuard<'_, Vec<LogEntry>> {
    logs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = lock_logs(logs);
    logs.push(entry.clone());
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(upload_files)
            .service(upload_history)
            .service(delete_upload)
            .service(yearly_totals)
            .service(available_years)
            .service(summary)
            .service(institutions)
            .service(geography)
            .service(categories)
            .service(topics)
            .service(get_logs)
            .service(health),
    );
}

pub fn start_server(
    app_state: Arc<AppState>,
    logs: Arc<Mutex<Vec<LogEntry>>>,
    server: &ServerConfig,
) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState { app_state, logs });
    let json_limit = server.max_upload_bytes;

    let http_server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Local dashboard, any origin

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().limit(json_limit))
            .configure(configure)
    })
    .bind((server.host.as_str(), server.port))?
    .run();

    info!(host = %server.host, port = server.port, "HTTP API listening");
    Ok(http_server)
}
