use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, error, info};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::EditorConfig,
    editor::{Editor, PointerButton},
    gfx::RenderEngine,
    ui::{editor_panels, UiManager},
};

/// Pixels of a touchpad scroll that count as one wheel line
const PIXELS_PER_LINE: f64 = 40.0;

/// Whether `event` reaches the editor although imgui captured it. Button
/// releases always do so a drag that ends over the panel still finishes;
/// cursor moves do while the editor owns a drag.
fn bypasses_ui_capture(event: &WindowEvent, pointer_captured: bool) -> bool {
    match event {
        WindowEvent::MouseInput {
            state: ElementState::Released,
            ..
        } => true,
        WindowEvent::CursorMoved { .. } => pointer_captured,
        _ => false,
    }
}

pub struct PrimeditApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: EditorConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    editor: Editor,
    started: Instant,
    cursor: (f32, f32),
    /// First fatal error; ends the event loop
    failure: Option<anyhow::Error>,
}

impl PrimeditApp {
    pub fn new(config: EditorConfig) -> Result<Self> {
        let event_loop = EventLoop::new().context("failed to create the event loop")?;
        let editor = Editor::new(&config, config.window.width, config.window.height);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                editor,
                started: Instant::now(),
                cursor: (0.0, 0.0),
                failure: None,
            },
        })
    }

    /// Runs the editor until the window closes.
    pub fn run(mut self) -> Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("the event loop was already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut self.app_state)
            .context("event loop terminated abnormally")?;

        match self.app_state.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, e: anyhow::Error) {
        error!("{e:#}");
        self.failure.get_or_insert(e);
        event_loop.exit();
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_config = &self.config.window;
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title(window_config.title.clone())
                    .with_inner_size(LogicalSize::new(window_config.width, window_config.height)),
            )
            .context("failed to create the window")?;
        let window = Arc::new(window);
        let (width, height) = window.inner_size().into();

        let renderer = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            &self.config.render,
            &self.editor.scene,
        ))?;

        let mut ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window,
            &self.config.ui,
        );
        ui_manager.update_display_size(width, height);
        self.editor.resize(width, height);
        info!("Editor window ready ({width}x{height})");

        self.window = Some(window);
        self.render_engine = Some(renderer);
        self.ui_manager = Some(ui_manager);
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let (Some(window), Some(render_engine), Some(ui_manager)) = (
            self.window.as_ref(),
            self.render_engine.as_mut(),
            self.ui_manager.as_mut(),
        ) else {
            return Ok(());
        };

        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.editor.update(elapsed_ms);

        // Panel edits land before the scene is drawn
        let editor = &mut self.editor;
        let ui_config = &self.config.ui;
        ui_manager.update_logic(window, |ui| editor_panels(ui, editor, ui_config));

        let overlay = self.editor.gizmo_lines();
        render_engine.render_frame(&self.editor.scene, &overlay, |device, queue, encoder, view| {
            ui_manager.render_display_only(device, queue, encoder, view)
        })
    }

    fn keyboard(&mut self, event_loop: &ActiveEventLoop, key: &Key) {
        match key {
            Key::Named(NamedKey::Escape) => event_loop.exit(),
            Key::Character(c) => {
                self.editor.key_pressed(&c.to_lowercase());
            }
            _ => {}
        }
    }

    fn mouse_button(&mut self, state: ElementState, button: MouseButton) {
        let button = match button {
            MouseButton::Left => PointerButton::Primary,
            MouseButton::Right => PointerButton::Secondary,
            _ => return,
        };
        match state {
            ElementState::Pressed => self.editor.pointer_down(button, self.cursor),
            ElementState::Released => self.editor.pointer_up(button),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_graphics(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // Handle UI input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let bypass = bypasses_ui_capture(&event, self.editor.pointer_captured());
            if ui_manager.handle_input(&window, window_id, &event) && !bypass {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if key_event.state == ElementState::Pressed && !key_event.repeat {
                    self.keyboard(event_loop, &key_event.logical_key);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                self.editor.pointer_moved(self.cursor);
            }
            WindowEvent::MouseInput { state, button, .. } => self.mouse_button(state, button),
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
                };
                self.editor.scroll(lines);
            }
            WindowEvent::DroppedFile(path) => {
                if !self.editor.request_texture(path.clone()) {
                    debug!("Ignoring dropped file {}", path.display());
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.editor.resize(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(width, height);
                }
            }
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::DeviceId;

    fn device() -> DeviceId {
        // SAFETY: the id is only compared, never handed to the platform
        unsafe { DeviceId::dummy() }
    }

    fn cursor_moved() -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(10.0, 10.0),
        }
    }

    fn mouse(state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button: MouseButton::Left,
        }
    }

    #[test]
    fn test_cursor_moves_follow_the_drag_over_the_panel() {
        assert!(!bypasses_ui_capture(&cursor_moved(), false));
        assert!(bypasses_ui_capture(&cursor_moved(), true));
    }

    #[test]
    fn test_releases_always_reach_the_editor() {
        assert!(bypasses_ui_capture(&mouse(ElementState::Released), false));
        assert!(!bypasses_ui_capture(&mouse(ElementState::Pressed), true));
        assert!(!bypasses_ui_capture(&WindowEvent::CloseRequested, true));
    }

    #[test]
    fn test_orbit_drag_captures_the_pointer() {
        let mut editor = Editor::new(&EditorConfig::default(), 800, 600);
        assert!(!editor.pointer_captured());

        editor.pointer_down(PointerButton::Primary, (5.0, 5.0));
        assert!(editor.pointer_captured());
        assert!(bypasses_ui_capture(&cursor_moved(), editor.pointer_captured()));

        editor.pointer_up(PointerButton::Primary);
        assert!(!editor.pointer_captured());
        assert!(!bypasses_ui_capture(&cursor_moved(), editor.pointer_captured()));
    }
}
