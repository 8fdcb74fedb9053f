//! Live camera "cartoon" stylization: flat colors with black outlines, computed per
//! frame on buffers allocated once per camera session.

pub mod cartoon;
pub mod config;
pub mod error;
pub mod resize;
pub mod toggle;
pub mod types;
pub mod vision;

#[cfg(feature = "app")]
pub mod camera;
#[cfg(feature = "app")]
pub mod draw;

pub use cartoon::{CartoonSession, Cartoonifier};
pub use config::{CartoonParams, SessionConfig};
pub use error::{AppError, CartoonError};
pub use toggle::StyleToggle;
