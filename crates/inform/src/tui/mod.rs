pub mod app;
pub mod event;
pub mod layout;
pub mod mode_selector;
pub mod prompt;
pub mod render;
pub mod spinner;
pub mod state;
pub mod terminal;
pub mod theme;
pub mod view_model;

pub use app::App;
pub use event::{AppEvent, EventLoop};
pub use render::{RenderContext, render};
pub use state::AppState;
pub use terminal::{TerminalGuard, install_panic_hook};
pub use theme::Theme;
