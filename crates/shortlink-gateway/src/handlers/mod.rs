mod health;
mod shortlink;

pub use health::health_handler;
pub use shortlink::{info_handler, redirect_handler, shorten_handler};
