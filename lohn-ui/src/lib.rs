pub mod app;
pub mod command;
pub mod export;
pub mod form;
pub mod history;
pub mod logging;
pub mod session;
pub mod settings;
pub mod utils;
pub mod view;
