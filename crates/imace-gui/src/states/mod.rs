mod textures;
mod ui;

pub use textures::{TextureCache, TextureKey};
pub use ui::{Tab, UIState};
