//! Interactive display of a rendered figure in a native window.

use crate::error::{Error, Result};
use crate::viz::Figure;
use eframe::egui;
use log::debug;

/// Render `figure` and show it until the window is closed.
pub fn show(figure: &Figure) -> Result<()> {
    let (w, h) = figure.pixel_size();
    let rgb = figure.render_rgb()?;
    let image = egui::ColorImage::from_rgb([w as usize, h as usize], &rgb);
    let title = if figure.scene().title.is_empty() {
        "xcsv_plot_map".to_string()
    } else {
        figure.scene().title.clone()
    };
    debug!("opening viewer for {}x{} figure", w, h);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([w as f32 + 16.0, h as f32 + 16.0])
            .with_min_inner_size([320.0, 240.0])
            .with_title(title.as_str()),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(FigureViewer::new(image)))),
    )
    .map_err(|e| Error::Viewer(e.to_string()))
}

struct FigureViewer {
    image: Option<egui::ColorImage>,
    texture: Option<egui::TextureHandle>,
}

impl FigureViewer {
    fn new(image: egui::ColorImage) -> Self {
        Self {
            image: Some(image),
            texture: None,
        }
    }
}

impl eframe::App for FigureViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.texture.is_none() {
            if let Some(image) = self.image.take() {
                self.texture = Some(ctx.load_texture("figure", image, egui::TextureOptions::LINEAR));
            }
        }
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(tex) = &self.texture {
                ui.add(
                    egui::Image::from_texture(egui::load::SizedTexture::from_handle(tex))
                        .shrink_to_fit(),
                );
            }
        });
    }
}
