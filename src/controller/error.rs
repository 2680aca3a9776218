use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("unable to start api: {0}")]
    Startup(#[from] std::io::Error),
    #[error("api server failed: {0}")]
    Serve(#[from] hyper::Error),
}
