use std::{
    f64::consts::{FRAC_PI_2, PI, TAU},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use eframe::NativeOptions;
use egui::{
    load::SizedTexture, mutex::RwLock, ColorImage, ComboBox, ImageSource, Slider, ViewportBuilder,
};
use gnomonic::{project_inverse, ImageView, ImageViewMut, InverseParams, Interpolation};
use image::{imageops, GenericImageView, RgbImage};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::listener::ViewChanges;

mod listener;

const TILE_SIZE: u32 = 600;

#[derive(Debug, Clone, Copy)]
struct View {
    yaw_deg: f64,
    pitch_deg: f64,
    half_fov_deg: f64,
    interpolation: Interpolation,
}

impl Default for View {
    fn default() -> Self {
        View {
            yaw_deg: 180.,
            pitch_deg: 0.,
            half_fov_deg: 40.,
            interpolation: Interpolation::Bilinear,
        }
    }
}

/// Panorama crop `(x, y, w, h)` whose share of the sphere gives the view's field of view.
// TODO: wrap the crop across the 0/2pi seam instead of clamping it inside the panorama.
fn window_for(pan_w: u32, pan_h: u32, view: &View) -> (u32, u32, u32, u32) {
    let half = view.half_fov_deg.to_radians();
    let win_w = ((half / PI) * f64::from(pan_w)).round().max(2.) as u32;
    let win_h = ((half / FRAC_PI_2) * f64::from(pan_h)).round().max(2.) as u32;
    let (win_w, win_h) = (win_w.min(pan_w), win_h.min(pan_h));

    let lon = view.yaw_deg.to_radians();
    let lat = -view.pitch_deg.to_radians();
    let cx = lon / TAU * f64::from(pan_w - 1);
    let cy = (lat / PI + 0.5) * f64::from(pan_h - 1);
    let x = (cx - f64::from(win_w) / 2.).round().clamp(0., f64::from(pan_w - win_w));
    let y = (cy - f64::from(win_h) / 2.).round().clamp(0., f64::from(pan_h - win_h));
    (x as u32, y as u32, win_w, win_h)
}

fn render_tile(panorama: &RgbImage, view: &View) -> gnomonic::Result<RgbImage> {
    let (pan_w, pan_h) = panorama.dimensions();
    let (x, y, win_w, win_h) = window_for(pan_w, pan_h, view);
    let window = imageops::crop_imm(panorama, x, y, win_w, win_h).to_image();

    let params = InverseParams {
        panorama_width: pan_w as usize,
        panorama_height: pan_h as usize,
        window_x: x as usize,
        window_y: y as usize,
        sensor_x: view.yaw_deg.to_radians() / TAU * f64::from(pan_w),
        sensor_y: (0.5 - view.pitch_deg.to_radians() / PI) * f64::from(pan_h),
    };

    let mut tile = RgbImage::new(TILE_SIZE, TILE_SIZE);
    let written = project_inverse(
        &mut ImageViewMut::from_image(&mut tile)?,
        &ImageView::from_image(&window)?,
        &params,
        &view.interpolation,
    )?;
    info!(written, window = ?(x, y, win_w, win_h), ?view, "tile rendered");
    Ok(tile)
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut panorama: Option<Arc<RgbImage>> = None;
    let mut view = View::default();
    let mut stale = false;

    let out_image: Arc<RwLock<Option<RgbImage>>> = Arc::new(RwLock::new(None));
    let out_tex: Arc<RwLock<Option<SizedTexture>>> = Arc::new(RwLock::new(None));
    let rendering = Arc::new(AtomicBool::new(false));

    let options = NativeOptions {
        viewport: ViewportBuilder::default().with_inner_size([1000., 640.]),
        ..Default::default()
    };
    eframe::run_simple_native("Gnomonic viewer", options, move |ctx, _frame| {
        egui_extras::install_image_loaders(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    let mut changes = ViewChanges::new(stale);

                    changes += ui.add(Slider::new(&mut view.yaw_deg, 0.0..=360.0).text("Yaw (°)"));
                    changes +=
                        ui.add(Slider::new(&mut view.pitch_deg, -85.0..=85.0).text("Pitch (°)"));
                    ui.shrink_width_to_current();
                    ui.separator();

                    changes += ui.add(
                        Slider::new(&mut view.half_fov_deg, 5.0..=80.0).text("Half FOV (°)"),
                    );
                    ComboBox::from_label("Interpolation")
                        .selected_text(view.interpolation.name())
                        .show_ui(ui, |ui| {
                            for mode in Interpolation::ALL {
                                changes +=
                                    ui.selectable_value(&mut view.interpolation, mode, mode.name());
                            }
                        });
                    ui.shrink_width_to_current();
                    ui.separator();

                    ui.horizontal(|ui| {
                        if ui.button("Open Panorama").clicked() {
                            let path = rfd::FileDialog::new()
                                .add_filter("Image", &["jpg", "jpeg", "png", "tif", "tiff", "webp"])
                                .pick_file();
                            if let Some(path) = path {
                                match image::open(&path) {
                                    Ok(img) => {
                                        let (width, height) = img.dimensions();
                                        info!(path = %path.display(), width, height, "panorama loaded");
                                        panorama = Some(Arc::new(img.to_rgb8()));
                                        changes += true;
                                    }
                                    Err(e) => {
                                        error!(path = %path.display(), "failed to open panorama: {e}");
                                        rfd::MessageDialog::new()
                                            .set_title("Error")
                                            .set_description(format!("Failed to open image: {}", e))
                                            .show();
                                    }
                                }
                            }
                        }

                        if ui.button("Save Tile").clicked() {
                            if let Some(tile) = &*out_image.read() {
                                let path = rfd::FileDialog::new()
                                    .add_filter("Image", &["png"])
                                    .set_file_name("tile.png")
                                    .save_file();
                                if let Some(path) = path {
                                    match tile.save(&path) {
                                        Ok(()) => info!(path = %path.display(), "tile saved"),
                                        Err(e) => {
                                            error!(path = %path.display(), "failed to save tile: {e}");
                                            rfd::MessageDialog::new()
                                                .set_title("Error")
                                                .set_description(format!(
                                                    "Failed to save image: {}",
                                                    e
                                                ))
                                                .show();
                                        }
                                    }
                                }
                            }
                        }
                    });

                    if !changes.any() {
                        return;
                    }

                    if rendering.load(Ordering::Relaxed) {
                        // re-render once the running job finishes
                        stale = true;
                        ui.spinner();
                        ctx.request_repaint();
                    } else if let Some(panorama) = &panorama {
                        stale = false;
                        let panorama = Arc::clone(panorama);
                        let out_image = Arc::clone(&out_image);
                        let out_tex = Arc::clone(&out_tex);
                        let rendering = Arc::clone(&rendering);
                        let ctx = ctx.clone();
                        rendering.store(true, Ordering::Relaxed);
                        thread::spawn(move || {
                            match render_tile(&panorama, &view) {
                                Ok(tile) => {
                                    let size = [tile.width() as usize, tile.height() as usize];
                                    let tex_manager = ctx.tex_manager();
                                    let id = tex_manager.write().alloc(
                                        "tile".into(),
                                        ColorImage::from_rgb(size, tile.as_raw()).into(),
                                        Default::default(),
                                    );
                                    let sized = SizedTexture::new(id, [size[0] as f32, size[1] as f32]);
                                    let previous = out_tex.write().replace(sized);
                                    if let Some(previous) = previous {
                                        tex_manager.write().free(previous.id);
                                    }
                                    out_image.write().replace(tile);
                                }
                                Err(e) => error!("failed to render tile: {e}"),
                            }
                            rendering.store(false, Ordering::Relaxed);
                            ctx.request_repaint();
                        });
                    }
                });

                if let Some(out_tex) = *out_tex.read() {
                    ui.image(ImageSource::Texture(out_tex));
                }
            });
        });
    })
}
