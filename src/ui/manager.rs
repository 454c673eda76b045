//! ImGui UI manager
//!
//! Handles ImGui integration with wgpu and winit, providing frame management,
//! input capture and rendering of the parameter panel on top of the scene.

use imgui::{Context, FontConfig, FontSource, MouseCursor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use log::warn;
use std::time::Instant;
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::{Window, WindowId},
};

use crate::config::UiConfig;

/// ImGui UI manager
///
/// Owns the ImGui context, its winit platform glue and the wgpu renderer.
/// Uses locked DPI so the panel keeps the configured font size.
pub struct UiManager {
    pub context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
}

impl UiManager {
    /// Creates a new UI manager
    ///
    /// Sets up ImGui with locked DPI and the configured font size, and a
    /// wgpu renderer that draws into the surface format.
    ///
    /// # Arguments
    /// * `device` - WGPU device for creating renderer resources
    /// * `queue` - WGPU queue for renderer operations
    /// * `output_color_format` - Target texture format for rendering
    /// * `window` - Window for platform integration
    /// * `config` - Font size of the panel
    pub fn new(
        device: &Device,
        queue: &Queue,
        output_color_format: TextureFormat,
        window: &Window,
        config: &UiConfig,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(1.0));

        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: config.font_size.max(8.0),
                ..Default::default()
            }),
        }]);

        let renderer_config = RendererConfig {
            texture_format: output_color_format,
            ..Default::default()
        };
        let renderer = Renderer::new(&mut context, device, queue, renderer_config);

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
        }
    }

    /// Updates ImGui's display size to match the surface
    ///
    /// # Arguments
    /// * `width` - New display width in pixels
    /// * `height` - New display height in pixels
    pub fn update_display_size(&mut self, width: u32, height: u32) {
        self.context.io_mut().display_size = [width as f32, height as f32];
    }

    /// Feeds a window event to ImGui
    ///
    /// Only input events are forwarded. Keyboard events count as captured
    /// while a text field has focus, pointer events while the cursor is
    /// over a window or a widget is active.
    ///
    /// # Arguments
    /// * `window` - Window reference for platform integration
    /// * `window_id` - Id the event was delivered for
    /// * `event` - Event to process
    ///
    /// # Returns
    /// True if the UI captured the input
    pub fn handle_input(&mut self, window: &Window, window_id: WindowId, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::MouseWheel { .. }
            | WindowEvent::KeyboardInput { .. }
            | WindowEvent::ModifiersChanged(_)
            | WindowEvent::Focused(_) => {
                let event: Event<()> = Event::WindowEvent {
                    window_id,
                    event: event.clone(),
                };
                self.platform.handle_event(self.context.io_mut(), window, &event);

                let io = self.context.io();
                match event {
                    Event::WindowEvent {
                        event: WindowEvent::KeyboardInput { .. } | WindowEvent::ModifiersChanged(_),
                        ..
                    } => io.want_capture_keyboard,
                    Event::WindowEvent {
                        event: WindowEvent::Focused(_),
                        ..
                    } => false,
                    _ => io.want_capture_mouse,
                }
            }
            _ => false,
        }
    }

    /// Prepares a new ImGui frame and builds it with `run_ui`
    ///
    /// Must be called once per frame before
    /// [`UiManager::render_display_only`].
    ///
    /// # Arguments
    /// * `window` - Window reference for platform operations
    /// * `run_ui` - Callback that builds the UI
    pub fn update_logic<F>(&mut self, window: &Window, run_ui: F)
    where
        F: FnOnce(&imgui::Ui),
    {
        let now = Instant::now();
        self.context.io_mut().update_delta_time(now - self.last_frame);
        self.last_frame = now;

        if let Err(e) = self.platform.prepare_frame(self.context.io_mut(), window) {
            warn!("Failed to prepare the UI frame: {e}");
        }

        let ui = self.context.frame();
        run_ui(ui);

        if self.last_cursor != ui.mouse_cursor() {
            self.last_cursor = ui.mouse_cursor();
            self.platform.prepare_render(ui, window);
        }
    }

    /// Renders the frame built by the last [`UiManager::update_logic`] on
    /// top of `color_attachment`
    ///
    /// # Arguments
    /// * `device` - WGPU device
    /// * `queue` - WGPU queue for buffer uploads
    /// * `encoder` - Encoder the scene was recorded into
    /// * `color_attachment` - Surface view; its contents are kept
    pub fn render_display_only(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        color_attachment: &TextureView,
    ) {
        let draw_data = self.context.render();

        if draw_data.display_size[0] <= 0.0 || draw_data.display_size[1] <= 0.0 {
            return;
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("imgui_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_attachment,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load, // keep the scene
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(e) = self.renderer.render(draw_data, queue, device, &mut render_pass) {
            warn!("Failed to render the UI: {e}");
        }
    }
}
