//! winit application loop.
//!
//! `App` implements `ApplicationHandler`: the window and all GPU resources
//! are created on `resumed`, events are routed through the overlay first and
//! then into [`Controls`], and every `RedrawRequested` renders one frame.
//! Initialisation failures are stashed and surfaced after the loop exits, so
//! the caller gets a proper `Result` instead of a panic inside the handler.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use glam::Mat4;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

use viewstate::ProgramState;

use crate::camera::Camera;
use crate::gpu::context::GpuContext;
use crate::gpu::mesh::GpuMesh;
use crate::gpu::pipeline::{PipelineLayouts, ScenePipelines};
use crate::gpu::texture;
use crate::gpu::uniforms::{CameraUniform, LightsUniform, ModelUniform};
use crate::input::{Binding, Controls};
use crate::overlay::DebugOverlay;
use crate::scene::{self, GeometrySource, ObjectKind, SceneObject};
use crate::ViewerConfig;

fn map_key(code: KeyCode) -> Option<Binding> {
    match code {
        KeyCode::KeyW => Some(Binding::Forward),
        KeyCode::KeyS => Some(Binding::Backward),
        KeyCode::KeyA => Some(Binding::Left),
        KeyCode::KeyD => Some(Binding::Right),
        KeyCode::Escape => Some(Binding::Exit),
        KeyCode::F1 => Some(Binding::ToggleOverlay),
        KeyCode::KeyL => Some(Binding::ToggleSpotlight),
        _ => None,
    }
}

/// One scene object uploaded to the GPU.
struct Drawable {
    object: SceneObject,
    mesh: GpuMesh,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
}

/// Window-bound rendering state, created once the event loop delivers
/// `resumed`.
struct Gfx {
    window: Arc<Window>,
    gpu: GpuContext,
    pipelines: ScenePipelines,
    camera_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    camera_uniform: CameraUniform,
    lights_uniform: LightsUniform,
    drawables: Vec<Drawable>,
    overlay: DebugOverlay,
    camera: Camera,
    controls: Controls,
    started: Instant,
    last_frame: Instant,
}

impl Gfx {
    fn new(window: Arc<Window>, config: &ViewerConfig, state: &ProgramState) -> Result<Self> {
        let gpu = GpuContext::new(window.clone(), config.antialiasing)?;
        let layouts = PipelineLayouts::new(&gpu.device);
        let pipelines =
            ScenePipelines::new(&gpu.device, &layouts, gpu.surface_format, gpu.sample_count);

        let camera_uniform = CameraUniform::new();
        let lights_uniform = LightsUniform::new();
        let camera_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera uniform"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let lights_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lights uniform"),
            size: std::mem::size_of::<LightsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame bind group"),
            layout: &layouts.frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_buffer.as_entire_binding(),
                },
            ],
        });

        let mut drawables = Vec::new();
        for object in scene::build_scene(&config.assets_root) {
            let mesh = match &object.geometry {
                GeometrySource::Inline(vertices) => {
                    GpuMesh::from_vertices(&gpu.device, object.name, vertices)
                }
                GeometrySource::Model(path) => match GpuMesh::load_obj(&gpu.device, path) {
                    Ok(mesh) => mesh,
                    Err(error) => {
                        tracing::warn!(
                            object = object.name,
                            path = %path.display(),
                            error = %error,
                            "failed to import model; skipping object"
                        );
                        continue;
                    }
                },
            };

            let model_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{} model uniform", object.name)),
                size: std::mem::size_of::<ModelUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let model_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{} model bind group", object.name)),
                layout: &layouts.object_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: model_buffer.as_entire_binding(),
                }],
            });
            let texture_bind_group = texture::create_binding(
                &gpu.device,
                &gpu.queue,
                &layouts.texture_layout,
                object.texture.as_deref(),
            );

            drawables.push(Drawable {
                object,
                mesh,
                model_buffer,
                model_bind_group,
                texture_bind_group,
            });
        }

        let overlay = DebugOverlay::new(&gpu.device, gpu.surface_format, &window);
        let camera = Camera::from_pose(&state.camera);
        let now = Instant::now();

        Ok(Self {
            window,
            gpu,
            pipelines,
            camera_buffer,
            lights_buffer,
            frame_bind_group,
            camera_uniform,
            lights_uniform,
            drawables,
            overlay,
            camera,
            controls: Controls::new(),
            started: now,
            last_frame: now,
        })
    }

    /// Captures or releases the pointer to match the overlay state. While
    /// captured the cursor is hidden and confined so mouse look works at
    /// the window edge.
    fn set_cursor_captured(&mut self, captured: bool) {
        if captured {
            if let Err(error) = self
                .window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Locked))
            {
                tracing::warn!(%error, "cursor grab unavailable");
            }
            self.window.set_cursor_visible(false);
            self.controls.reset_pointer();
        } else {
            if let Err(error) = self.window.set_cursor_grab(CursorGrabMode::None) {
                tracing::warn!(%error, "failed to release cursor grab");
            }
            self.window.set_cursor_visible(true);
        }
    }

    fn render(&mut self, state: &mut ProgramState) -> std::result::Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        let elapsed = self.started.elapsed().as_secs_f32();

        self.controls.apply_movement(&mut self.camera, dt);

        self.camera_uniform
            .update(&self.camera, self.gpu.aspect_ratio());
        self.lights_uniform.update(state, &self.camera);
        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
        self.gpu.queue.write_buffer(
            &self.lights_buffer,
            0,
            bytemuck::cast_slice(&[self.lights_uniform]),
        );

        for drawable in &self.drawables {
            let model = match drawable.object.kind {
                ObjectKind::Indicator => Mat4::from_translation(state.point_light.position),
                ObjectKind::Opaque => drawable
                    .object
                    .animation
                    .model_matrix(drawable.object.base_transform, elapsed),
            };
            let uniform = ModelUniform::from_parts(model, &drawable.object.material);
            self.gpu
                .queue
                .write_buffer(&drawable.model_buffer, 0, bytemuck::cast_slice(&[uniform]));
        }

        let frame = self.gpu.surface.get_current_texture()?;
        let frame_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let overlay_frame = self.overlay.prepare(&self.window, state, &self.camera);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        {
            let (attachment, resolve_target) = self.gpu.color_attachment(&frame_view);
            let clear = wgpu::Color {
                r: state.clear_color[0] as f64,
                g: state.clear_color[1] as f64,
                b: state.clear_color[2] as f64,
                a: 1.0,
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.gpu.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for drawable in &self.drawables {
                match drawable.object.kind {
                    ObjectKind::Opaque => {
                        pass.set_pipeline(&self.pipelines.lighting);
                        pass.set_bind_group(1, &drawable.model_bind_group, &[]);
                        pass.set_bind_group(2, &drawable.texture_bind_group, &[]);
                    }
                    ObjectKind::Indicator => {
                        pass.set_pipeline(&self.pipelines.flat);
                        pass.set_bind_group(1, &drawable.model_bind_group, &[]);
                    }
                }
                pass.set_vertex_buffer(0, drawable.mesh.vertex_buffer.slice(..));
                pass.draw(0..drawable.mesh.vertex_count, 0..1);
            }
        }

        self.overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &overlay_frame,
            &screen_descriptor,
        );
        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("overlay pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &frame_view,
                        depth_slice: None,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.overlay
                .paint(&mut egui_pass, &overlay_frame, &screen_descriptor);
        }
        self.overlay.cleanup(&overlay_frame);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        // Keep the persisted pose current so exit saves the latest camera.
        state.camera = self.camera.pose();
        Ok(())
    }
}

pub(crate) struct App {
    config: ViewerConfig,
    state: ProgramState,
    gfx: Option<Gfx>,
    init_error: Option<anyhow::Error>,
}

impl App {
    pub(crate) fn new(config: ViewerConfig) -> Self {
        let state = config.state.clone();
        Self {
            config,
            state,
            gfx: None,
            init_error: None,
        }
    }

    pub(crate) fn into_outcome(self) -> Result<ProgramState> {
        match self.init_error {
            Some(error) => Err(error),
            None => Ok(self.state),
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode, pressed: bool) {
        let Some(binding) = map_key(code) else {
            return;
        };
        let Some(gfx) = self.gfx.as_mut() else {
            return;
        };

        let overlay_before = self.state.overlay_enabled;
        gfx.controls.key_event(binding, pressed, &mut self.state);

        if self.state.overlay_enabled != overlay_before {
            gfx.set_cursor_captured(!self.state.overlay_enabled);
        }
        if gfx.controls.close_requested() {
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gfx.is_some() {
            return;
        }

        let (width, height) = self.config.surface_size;
        let attributes = Window::default_attributes()
            .with_title("roomview")
            .with_inner_size(PhysicalSize::new(width, height));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(error) => {
                self.init_error = Some(
                    anyhow::Error::new(error).context("failed to create the viewer window"),
                );
                event_loop.exit();
                return;
            }
        };

        match Gfx::new(window, &self.config, &self.state) {
            Ok(mut gfx) => {
                gfx.set_cursor_captured(!self.state.overlay_enabled);
                tracing::info!(
                    width,
                    height,
                    samples = gfx.gpu.sample_count,
                    objects = gfx.drawables.len(),
                    "viewer ready"
                );
                self.gfx = Some(gfx);
            }
            Err(error) => {
                self.init_error = Some(error.context("failed to initialise the renderer"));
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gfx) = self.gfx.as_mut() else {
            return;
        };

        let window = gfx.window.clone();
        let egui_consumed = gfx.overlay.handle_window_event(&window, &event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(new_size) => {
                gfx.gpu.resize(new_size);
                window.request_redraw();
            }
            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    let pressed = event.state == ElementState::Pressed;
                    self.handle_key(event_loop, code, pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } if !egui_consumed => {
                gfx.controls
                    .pointer_moved(position.x, position.y, &mut gfx.camera, &self.state);
            }
            WindowEvent::MouseWheel { delta, .. } if !egui_consumed => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / 20.0,
                };
                gfx.controls.scroll(steps, &mut gfx.camera);
            }
            WindowEvent::RedrawRequested => match gfx.render(&mut self.state) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = gfx.gpu.size;
                    gfx.gpu.resize(size);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    tracing::error!("GPU out of memory; shutting down");
                    self.init_error = Some(anyhow::anyhow!("GPU out of memory"));
                    event_loop.exit();
                }
                Err(error) => {
                    tracing::warn!(%error, "frame skipped");
                }
            },
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gfx) = &self.gfx {
            gfx.window.request_redraw();
        }
    }
}
