//! Window configuration
//!
//! Translates engine window settings into winit attributes. Windows are
//! created by the caller inside `ApplicationHandler::resumed`.

use winit::{
    dpi::LogicalSize,
    window::{Window, WindowAttributes},
};

#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub min_size: Option<(u32, u32)>,
    pub max_size: Option<(u32, u32)>,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Tessel".to_string(),
            width: 1280,
            height: 720,
            min_size: None,
            max_size: None,
            resizable: true,
        }
    }
}

impl WindowConfig {
    /// Inner size clamped into the configured min/max bounds.
    pub fn clamped_size(&self) -> (u32, u32) {
        let (mut w, mut h) = (self.width, self.height);
        if let Some((min_w, min_h)) = self.min_size {
            w = w.max(min_w);
            h = h.max(min_h);
        }
        if let Some((max_w, max_h)) = self.max_size {
            w = w.min(max_w);
            h = h.min(max_h);
        }
        (w, h)
    }

    /// Create window attributes from config
    pub fn window_attributes(&self) -> WindowAttributes {
        let (width, height) = self.clamped_size();
        let mut attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(width, height))
            .with_resizable(self.resizable);
        if let Some((w, h)) = self.min_size {
            attrs = attrs.with_min_inner_size(LogicalSize::new(w, h));
        }
        if let Some((w, h)) = self.max_size {
            attrs = attrs.with_max_inner_size(LogicalSize::new(w, h));
        }
        attrs
    }
}
