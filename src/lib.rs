pub mod config;
pub mod controller;
pub mod datastore;
pub mod log;
pub mod model;
pub mod view;
