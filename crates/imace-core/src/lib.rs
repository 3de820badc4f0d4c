pub mod api;
pub mod config;
pub mod consts;
pub mod deletion;
pub mod error;
pub mod fetch;
pub mod model;
pub mod pagination;
pub mod recent;
pub mod spatial;
pub mod store;
pub mod upload;
pub mod view;
