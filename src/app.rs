use crate::io::asset_loader::{LoadedAsset, describe_asset, spawn_load};
use crate::io::config::ViewerConfig;
use crate::pipeline::renderer::Renderer;
use crate::scene::Scene;
use crate::scene::orbit::OrbitController;
use egui::{Color32, RichText};
use log::{debug, info};
use nalgebra::Point3;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

/// Pointer state for the image drag interaction.
#[derive(Default)]
struct InterfaceInteraction {
    last_mouse_pos: Option<egui::Pos2>,
}

/// The viewer window: drives the continuous render loop, polls the asset
/// loader, and maps pointer input onto the orbit controller.
pub struct ViewerApp {
    config: ViewerConfig,

    renderer: Renderer,
    scene: Scene,
    orbit: OrbitController,

    /// Pending result of the background asset load; `None` once resolved.
    loader: Option<Receiver<Result<LoadedAsset, String>>>,
    /// Bounding radius of the attached model, for the focus shortcut.
    model_radius: Option<f32>,

    rendered_image: Option<egui::TextureHandle>,
    status_message: String,
    interaction: InterfaceInteraction,

    last_frame_time: Option<Instant>,
    fps_history: Vec<f32>,
    avg_fps: f32,
}

const FPS_HISTORY_SIZE: usize = 30;

impl ViewerApp {
    pub fn new(config: ViewerConfig, cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let width = config.window.width.max(1);
        let height = config.window.height.max(1);
        let renderer = Renderer::new(width, height);
        let scene = Scene::from_config(&config, width as f32 / height as f32);
        let orbit = OrbitController::from_camera(&scene.camera, &config.controls);

        let status_message = format!("Loading {}...", describe_asset(&config.asset));
        let loader = Some(spawn_load(&config.asset));

        Self {
            config,
            renderer,
            scene,
            orbit,
            loader,
            model_radius: None,
            rendered_image: None,
            status_message,
            interaction: InterfaceInteraction::default(),
            last_frame_time: None,
            fps_history: Vec::new(),
            avg_fps: 0.0,
        }
    }

    /// Checks whether the background load has finished. The frame loop never
    /// waits on it; a failed load just leaves the scene model-less.
    fn poll_loader(&mut self) {
        let Some(receiver) = &self.loader else {
            return;
        };

        match receiver.try_recv() {
            Ok(Ok(asset)) => {
                self.status_message = format!(
                    "Loaded '{}' ({} triangles)",
                    asset.model.name,
                    asset.model.triangle_count()
                );
                self.model_radius = Some(asset.radius);
                self.scene.attach_model(asset.model);
                self.loader = None;
            }
            Ok(Err(e)) => {
                // Already logged by the loader thread.
                self.status_message = format!("Load failed: {e}");
                self.loader = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.status_message = "Loader thread terminated unexpectedly".to_string();
                self.loader = None;
            }
        }
    }

    /// Matches the framebuffer and the camera aspect ratio to the panel.
    fn sync_viewport(&mut self, panel_size: egui::Vec2) {
        let width = (panel_size.x.floor() as usize).max(1);
        let height = (panel_size.y.floor() as usize).max(1);

        if width != self.renderer.framebuffer.width || height != self.renderer.framebuffer.height {
            debug!("Viewport resized to {}x{}", width, height);
            self.renderer.resize(width, height);
            self.scene
                .camera
                .set_aspect_ratio(width as f32 / height as f32);
            self.rendered_image = None;
        }
    }

    /// Uploads the framebuffer into the egui texture shown by the central panel.
    fn upload_frame(&mut self, ctx: &egui::Context) {
        let width = self.renderer.framebuffer.width;
        let height = self.renderer.framebuffer.height;
        let rgba = self.renderer.framebuffer.to_rgba_bytes();
        let image = egui::ColorImage::from_rgba_unmultiplied([width, height], &rgba);

        match &mut self.rendered_image {
            Some(texture) => texture.set(image, egui::TextureOptions::default()),
            None => {
                self.rendered_image = Some(ctx.load_texture(
                    "viewer_frame",
                    image,
                    egui::TextureOptions::default(),
                ));
            }
        }
    }

    fn handle_camera_interaction(&mut self, response: &egui::Response, ctx: &egui::Context) {
        if response.dragged() {
            if let (Some(last), Some(current)) = (
                self.interaction.last_mouse_pos,
                response.interact_pointer_pos(),
            ) {
                let delta = current - last;
                if delta.length() >= 1.0 {
                    self.orbit.orbit_by(delta.x, delta.y);
                }
            }
            self.interaction.last_mouse_pos = response.interact_pointer_pos();
        } else {
            self.interaction.last_mouse_pos = None;
        }

        if response.hovered() {
            let scroll_delta = ctx.input(|i| i.smooth_scroll_delta.y);
            if scroll_delta.abs() > 0.1 {
                self.orbit.dolly_by(scroll_delta * 0.01);
            }
        }

        ctx.input(|i| {
            if i.key_pressed(egui::Key::R) {
                self.orbit.reset();
                self.status_message = "Camera reset".to_string();
            }
            if i.key_pressed(egui::Key::F) {
                if let Some(radius) = self.model_radius {
                    self.orbit
                        .set_focus(&mut self.scene.camera, Point3::origin(), radius);
                    self.status_message = "Focused on model".to_string();
                }
            }
        });
    }

    fn update_fps_stats(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.fps_history.push(1.0 / dt);
        if self.fps_history.len() > FPS_HISTORY_SIZE {
            self.fps_history.remove(0);
        }
        self.avg_fps = self.fps_history.iter().sum::<f32>() / self.fps_history.len() as f32;
    }

    fn fps_display(&self) -> (String, Color32) {
        let color = if self.avg_fps >= 30.0 {
            Color32::from_rgb(50, 220, 50)
        } else if self.avg_fps >= 15.0 {
            Color32::from_rgb(220, 180, 50)
        } else {
            Color32::from_rgb(220, 50, 50)
        };
        (format!("FPS: {:.1}", self.avg_fps), color)
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader();

        let now = Instant::now();
        let dt = self
            .last_frame_time
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(1.0 / 60.0);
        self.last_frame_time = Some(now);
        self.update_fps_stats(dt);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(&self.config.window.title);
                ui.separator();
                ui.label(&self.status_message);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let (fps_text, fps_color) = self.fps_display();
                    ui.label(RichText::new(fps_text).color(fps_color));
                    ui.separator();
                    ui.label("Drag: orbit | Scroll: zoom | R: reset | F: focus");
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            self.sync_viewport(available);

            self.orbit.update(dt, &mut self.scene.camera);
            self.renderer.render_scene(&self.scene);
            self.upload_frame(ctx);

            if let Some(texture) = &self.rendered_image {
                let response = ui.add(
                    egui::Image::new(texture)
                        .fit_to_exact_size(available)
                        .sense(egui::Sense::click_and_drag()),
                );
                self.handle_camera_interaction(&response, ctx);
            }
        });

        // Perpetual loop: render the next frame as soon as this one is shown.
        ctx.request_repaint();
    }
}

/// Opens the viewer window and runs it until closed.
pub fn start_gui(config: ViewerConfig) -> Result<(), eframe::Error> {
    let title = config.window.title.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([
                config.window.width as f32,
                config.window.height as f32 + 32.0,
            ])
            .with_min_inner_size([640.0, 360.0]),
        ..Default::default()
    };

    info!("Opening viewer window ({}x{})", config.window.width, config.window.height);

    eframe::run_native(
        &title,
        options,
        Box::new(|cc| Ok(Box::new(ViewerApp::new(config, cc)))),
    )
}
