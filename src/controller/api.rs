use http::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use http::{Method, StatusCode};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response};
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde_derive::Serialize;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, error, info, instrument, warn};

use std::borrow::Cow;
use std::convert::Infallible;
use std::net::{SocketAddr, TcpListener};
use std::str::Utf8Error;
use std::sync::Arc;
use std::time::Duration;

use super::ControllerError;
use crate::datastore::{DataStoreError, TaskDataStore};
use crate::model::{NewTask, TaskPatch};
use crate::view::{filter_tasks, DateClassifier, Stats, ViewError, ViewFilter};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub timeout: Option<u64>,
}

impl ServerConfig {
    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

pub struct Server<D> {
    config: ServerConfig,
    datastore: Arc<D>,
}

impl<D> Server<D>
where
    D: TaskDataStore + 'static,
{
    pub fn new(config: ServerConfig, datastore: Arc<D>) -> Server<D> {
        Server { config, datastore }
    }

    pub async fn serve(self, listener: TcpListener) -> Result<(), ControllerError> {
        let addr = listener.local_addr()?;
        info!(addr = %addr, "Starting api...");
        let timeout = self.config.request_timeout();
        let datastore = self.datastore;

        let make_svc = make_service_fn(move |_conn| {
            let datastore = datastore.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |req| {
                    let datastore = datastore.clone();
                    async move { Ok::<_, Infallible>(respond(datastore, req, timeout).await) }
                }))
            }
        });

        hyper::Server::from_tcp(listener)?.serve(make_svc).await?;
        Ok(())
    }
}

/// Routes one request, bounded by `timeout`, and decorates the answer with CORS headers.
///
/// Only the wait is bounded: the routed request runs on its own task, so a store
/// mutation that outlives the timeout still completes while holding the store lock.
pub async fn respond<D>(datastore: Arc<D>, req: Request<Body>, timeout: Duration) -> Response<Body>
where
    D: TaskDataStore + 'static,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let routed = tokio::spawn(async move { route(&*datastore, req).await });
    let mut response = match tokio::time::timeout(timeout, routed).await {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => {
            error!(method = %method, path = %path, reason = %err, "Request handler failed.");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
        Err(_) => {
            warn!(method = %method, path = %path, "Request timed out.");
            error_response(StatusCode::SERVICE_UNAVAILABLE, "Request timed out")
        }
    };
    allow_cors(response.headers_mut());
    debug!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        "Request served."
    );
    response
}

pub async fn route<D: TaskDataStore>(datastore: &D, req: Request<Body>) -> Response<Body> {
    let segments = match resource_segments(req.uri().path()) {
        Ok(segments) => segments,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid request path"),
    };
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
    let query = req.uri().query().map(str::to_string);

    match (req.method().clone(), segments.as_slice()) {
        (Method::OPTIONS, _) => preflight(),
        (Method::GET, ["health"]) => health(),
        (Method::GET, ["tasks"]) => list_tasks(datastore, query.as_deref()).await,
        (Method::GET, ["tasks", "stats"]) => task_stats(datastore).await,
        (Method::POST, ["tasks"]) => create_task(datastore, req.into_body()).await,
        (Method::PUT, ["tasks", id]) => update_task(datastore, id, req.into_body()).await,
        (Method::DELETE, ["tasks", id]) => delete_task(datastore, id).await,
        _ => error_response(StatusCode::NOT_FOUND, "Not found"),
    }
}

// `/api/tasks/...` and `/tasks/...` address the same resources. Segments are
// percent-decoded and must be UTF-8.
fn resource_segments(path: &str) -> Result<Vec<String>, Utf8Error> {
    let path = match path.strip_prefix("/api") {
        Some(rest) if rest.starts_with("/tasks") => rest,
        _ => path,
    };
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| percent_decode_str(segment).decode_utf8().map(Cow::into_owned))
        .collect()
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

#[derive(Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

#[derive(Serialize)]
struct HealthBody<'a> {
    status: &'a str,
    message: &'a str,
}

fn health() -> Response<Body> {
    json_response(
        StatusCode::OK,
        &HealthBody {
            status: "OK",
            message: "Task Board API is running",
        },
    )
}

#[instrument(skip(datastore))]
async fn list_tasks<D: TaskDataStore>(datastore: &D, query: Option<&str>) -> Response<Body> {
    let view = match ListQuery::parse(query) {
        Ok(view) => view,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    };

    match datastore.list().await {
        Ok(tasks) => match view {
            None => json_response(StatusCode::OK, &tasks),
            Some(view) => {
                let clock = DateClassifier::now();
                let visible = filter_tasks(&tasks, &view.search, &view.filter, &clock);
                json_response(StatusCode::OK, &visible)
            }
        },
        Err(err) => datastore_error(err, "Failed to retrieve tasks"),
    }
}

#[instrument(skip(datastore))]
async fn task_stats<D: TaskDataStore>(datastore: &D) -> Response<Body> {
    match datastore.list().await {
        Ok(tasks) => json_response(
            StatusCode::OK,
            &Stats::compute(&tasks, &DateClassifier::now()),
        ),
        Err(err) => datastore_error(err, "Failed to retrieve tasks"),
    }
}

#[instrument(skip(datastore, body))]
async fn create_task<D: TaskDataStore>(datastore: &D, body: Body) -> Response<Body> {
    let new_task: NewTask = match read_json(body).await {
        Ok(new_task) => new_task,
        Err(response) => return response,
    };

    match datastore.create(new_task).await {
        Ok(task) => json_response(StatusCode::CREATED, &task),
        Err(err) => datastore_error(err, "Failed to create task"),
    }
}

#[instrument(skip(datastore, body))]
async fn update_task<D: TaskDataStore>(datastore: &D, id: &str, body: Body) -> Response<Body> {
    let patch: TaskPatch = match read_json(body).await {
        Ok(patch) => patch,
        Err(response) => return response,
    };

    match datastore.update(id, patch).await {
        Ok(task) => json_response(StatusCode::OK, &task),
        Err(err) => datastore_error(err, "Failed to update task"),
    }
}

#[instrument(skip(datastore))]
async fn delete_task<D: TaskDataStore>(datastore: &D, id: &str) -> Response<Body> {
    match datastore.delete(id).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &MessageBody {
                message: "Task deleted successfully",
            },
        ),
        Err(err) => datastore_error(err, "Failed to delete task"),
    }
}

/// Optional view parameters of `GET /tasks`; `None` when none were given.
struct ListQuery {
    search: String,
    filter: ViewFilter,
}

impl ListQuery {
    fn parse(query: Option<&str>) -> Result<Option<ListQuery>, ViewError> {
        let query = match query.filter(|q| !q.is_empty()) {
            Some(query) => query,
            None => return Ok(None),
        };

        let mut view = ListQuery {
            search: String::new(),
            filter: ViewFilter::default(),
        };
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "search" => view.search = value.into_owned(),
                "status" => view.filter.status = value.parse()?,
                "date" => view.filter.date = value.parse()?,
                _ => (),
            }
        }
        Ok(Some(view))
    }
}

async fn read_json<T>(body: Body) -> Result<T, Response<Body>>
where
    T: DeserializeOwned + Default,
{
    let bytes = hyper::body::to_bytes(body).await.map_err(|err| {
        warn!(reason = %err, "Unable to read request body.");
        error_response(StatusCode::BAD_REQUEST, "Unable to read request body")
    })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(&bytes).map_err(|err| {
        error_response(
            StatusCode::BAD_REQUEST,
            &format!("Invalid request body: {}", err),
        )
    })
}

fn datastore_error(err: DataStoreError, failure: &str) -> Response<Body> {
    match err {
        DataStoreError::Validation(err) => {
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
        DataStoreError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "Task not found"),
        DataStoreError::Storage(err) => {
            error!(reason = %err, "{}", failure);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, failure)
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response<Body> {
    json_response(status, &ErrorBody { error: message })
}

fn json_response<T: serde::Serialize + ?Sized>(status: StatusCode, body: &T) -> Response<Body> {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(err) => {
            error!(reason = %err, "Unable to encode response.");
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

fn preflight() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}

fn allow_cors(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
}

pub fn build_runtime<D>(cfg: ServerConfig, datastore: Arc<D>) -> Result<Runtime, ControllerError>
where
    D: TaskDataStore + 'static,
{
    let runtime = Builder::new_multi_thread()
        .thread_name("http-api")
        .enable_all()
        .build()?;

    let listener = TcpListener::bind(cfg.addr)?;
    listener.set_nonblocking(true)?;

    let api = Server::new(cfg, datastore);
    runtime.handle().spawn(async move {
        if let Err(err) = api.serve(listener).await {
            error!(reason = %err, "Unable to start API.");
        }
    });
    Ok(runtime)
}
