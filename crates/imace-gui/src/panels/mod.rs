pub mod detail;
pub mod gallery;
pub(crate) mod helpers;
pub mod menu_bar;
pub mod search_bar;
pub mod settings;
pub mod spatial;
pub mod status;
