//! egui debug overlay.
//!
//! Two floating windows: scene settings (background colour, spotlight,
//! point-light attenuation, backpack placement) and a camera readout with
//! the mouse-look checkbox. The overlay edits [`ProgramState`] directly, so
//! the render loop picks changes up on the same frame.

use egui::ViewportId;
use winit::event::WindowEvent;
use winit::window::Window;

use viewstate::ProgramState;

use crate::camera::Camera;

pub(crate) struct DebugOverlay {
    ctx: egui::Context,
    winit_state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

/// Tessellated output of one overlay frame, handed to the egui render pass.
pub(crate) struct OverlayFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
}

impl DebugOverlay {
    pub(crate) fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let ctx = egui::Context::default();
        let winit_state = egui_winit::State::new(
            ctx.clone(),
            ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        // The overlay pass draws into the resolved frame, so one sample.
        let renderer = egui_wgpu::Renderer::new(
            device,
            surface_format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: false,
                ..Default::default()
            },
        );
        Self {
            ctx,
            winit_state,
            renderer,
        }
    }

    /// Feeds a window event to egui; returns true when egui consumed it and
    /// the viewer should not act on it.
    pub(crate) fn handle_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit_state.on_window_event(window, event).consumed
    }

    /// Runs one egui frame and tessellates its output. When the overlay is
    /// hidden no windows are emitted, which keeps egui's input plumbing warm
    /// without drawing anything.
    pub(crate) fn prepare(
        &mut self,
        window: &Window,
        state: &mut ProgramState,
        camera: &Camera,
    ) -> OverlayFrame {
        let raw_input = self.winit_state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, |ctx| {
            if state.overlay_enabled {
                draw_windows(ctx, state, camera);
            }
        });
        self.winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        OverlayFrame {
            primitives,
            textures_delta: full_output.textures_delta,
        }
    }

    pub(crate) fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        frame: &OverlayFrame,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &frame.textures_delta.set {
            self.renderer
                .update_texture(device, queue, *id, image_delta);
        }
        let _ = self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &frame.primitives,
            screen_descriptor,
        );
    }

    pub(crate) fn paint(
        &mut self,
        pass: &mut wgpu::RenderPass<'static>,
        frame: &OverlayFrame,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.renderer
            .render(pass, &frame.primitives, screen_descriptor);
    }

    pub(crate) fn cleanup(&mut self, frame: &OverlayFrame) {
        for id in &frame.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

fn draw_windows(ctx: &egui::Context, state: &mut ProgramState, camera: &Camera) {
    egui::Window::new("Scene settings").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label("Background");
            ui.color_edit_button_rgb(&mut state.clear_color);
        });
        ui.checkbox(&mut state.spotlight_enabled, "Spotlight");

        ui.separator();
        ui.label("Point light attenuation");
        ui.add(
            egui::DragValue::new(&mut state.point_light.constant)
                .speed(0.05)
                .prefix("constant: "),
        );
        ui.add(
            egui::DragValue::new(&mut state.point_light.linear)
                .speed(0.05)
                .prefix("linear: "),
        );
        ui.add(
            egui::DragValue::new(&mut state.point_light.quadratic)
                .speed(0.05)
                .prefix("quadratic: "),
        );

        ui.separator();
        ui.label("Backpack");
        ui.add(
            egui::DragValue::new(&mut state.backpack_scale)
                .speed(0.05)
                .prefix("scale: "),
        );
        ui.horizontal(|ui| {
            ui.add(egui::DragValue::new(&mut state.backpack_position.x).speed(0.05));
            ui.add(egui::DragValue::new(&mut state.backpack_position.y).speed(0.05));
            ui.add(egui::DragValue::new(&mut state.backpack_position.z).speed(0.05));
        });
    });

    egui::Window::new("Camera").show(ctx, |ui| {
        let p = camera.position;
        let f = camera.front;
        ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
        ui.label(format!("Front: ({:.2}, {:.2}, {:.2})", f.x, f.y, f.z));
        ui.label(format!(
            "Yaw: {:.1}  Pitch: {:.1}  Fov: {:.1}",
            camera.yaw, camera.pitch, camera.zoom
        ));
        ui.checkbox(&mut state.camera_mouse_update_enabled, "Mouse look");
    });
}
