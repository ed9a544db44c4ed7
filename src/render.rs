//! Rendering backends for image grids, scatter plots and loss curves.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, trace};
use ndarray::{ArrayView1, ArrayView2, Axis};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{Palette, Palette99};

use crate::error::{Error, Result};

/// Class colors, matching the usual matplotlib shorthands `r g b c m y k`.
const CLASS_COLORS: [RGBColor; 10] = [
    RGBColor(255, 0, 0),
    RGBColor(0, 128, 0),
    RGBColor(0, 0, 255),
    RGBColor(0, 191, 191),
    RGBColor(191, 0, 191),
    RGBColor(191, 191, 0),
    RGBColor(0, 0, 0),
    RGBColor(0xFA, 0xC2, 0x68),
    RGBColor(0xFA, 0x81, 0x8A),
    RGBColor(0xA9, 0x9B, 0xFA),
];

/// Anything that can display the plots produced by this crate.
pub trait Renderer {
    /// Draws up to `max_count` rows of `rows` as square grayscale images.
    fn show_image_grid(
        &mut self,
        rows: ArrayView2<f32>,
        max_count: usize,
        max_intensity: f32,
    ) -> Result<()>;

    /// Draws one 2D point series per class; `groups[i]` belongs to class `i`.
    fn show_scatter(&mut self, groups: &[ArrayView2<f32>], title: &str) -> Result<()>;

    /// Draws a single loss value per epoch.
    fn show_loss_curve(&mut self, values: &[f32]) -> Result<()>;
}

/// Figure sizes used by [`SvgRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Size of scatter and loss charts in pixels.
    pub chart_size: (u32, u32),
    /// Edge length of one image pixel in output pixels.
    pub image_cell: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            chart_size: (800, 600),
            image_cell: 8,
        }
    }
}

impl RenderConfig {
    pub fn with_chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_size = (width.max(64), height.max(64));
        self
    }

    pub fn with_image_cell(mut self, cell: u32) -> Self {
        self.image_cell = cell.max(1);
        self
    }
}

/// One rendered SVG document.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub name: &'static str,
    pub svg: String,
}

/// Renders every plot into an in-memory SVG document.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    config: RenderConfig,
    figures: Vec<Figure>,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::with_config(RenderConfig::default())
    }

    pub fn with_config(config: RenderConfig) -> Self {
        SvgRenderer {
            config,
            figures: Vec::new(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    /// Writes every figure to `dir` as `NN-name.svg` and returns the paths.
    pub fn save(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut paths = Vec::with_capacity(self.figures.len());
        for (i, figure) in self.figures.iter().enumerate() {
            let path = dir.join(format!("{:02}-{}.svg", i, figure.name));
            fs::write(&path, &figure.svg)?;
            paths.push(path);
        }
        info!("saved {} figures to {}", paths.len(), dir.display());
        Ok(paths)
    }

    fn record<F>(&mut self, name: &'static str, size: (u32, u32), draw: F) -> Result<()>
    where
        F: FnOnce(&DrawingArea<SVGBackend, Shift>) -> Result<()>,
    {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            root.fill(&WHITE)?;
            draw(&root)?;
            root.present()?;
        }
        self.figures.push(Figure { name, svg });
        Ok(())
    }
}

fn class_color(class: usize) -> RGBColor {
    match CLASS_COLORS.get(class) {
        Some(&color) => color,
        None => {
            let (r, g, b) = Palette99::COLORS[class % Palette99::COLORS.len()];
            RGBColor(r, g, b)
        }
    }
}

/// Gray level of a pixel shown as `max_intensity - value`.
fn gray(value: f32, max_intensity: f32) -> RGBColor {
    let inverted = max_intensity - value.clamp(0.0, max_intensity);
    let level = (inverted / max_intensity * 255.0).round() as u8;
    RGBColor(level, level, level)
}

/// Finite min/max of `values`, widened when empty or degenerate.
fn axis_range(values: impl IntoIterator<Item = f32>) -> std::ops::Range<f32> {
    let bounds = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f32::min(lo, v), f32::max(hi, v))),
        });
    match bounds {
        None => 0.0..1.0,
        Some((lo, hi)) if hi <= lo => (lo - 0.5)..(hi + 0.5),
        Some((lo, hi)) => {
            let pad = (hi - lo) * 0.05;
            (lo - pad)..(hi + pad)
        }
    }
}

fn draw_image<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    row: ArrayView1<f32>,
    side: usize,
    max_intensity: f32,
) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .margin(2)
        .build_cartesian_2d(0..side, 0..side)?;
    chart.draw_series((0..side * side).map(|k| {
        let (y, x) = (k / side, k % side);
        Rectangle::new(
            [(x, side - y), (x + 1, side - y - 1)],
            gray(row[k], max_intensity).filled(),
        )
    }))?;
    Ok(())
}

impl Renderer for SvgRenderer {
    fn show_image_grid(
        &mut self,
        rows: ArrayView2<f32>,
        max_count: usize,
        max_intensity: f32,
    ) -> Result<()> {
        if !(max_intensity > 0.0) {
            return Err(Error::InvalidIntensity(max_intensity));
        }
        let len = rows.len_of(Axis(1));
        let side = (len as f64).sqrt().round() as usize;
        if side == 0 || side * side != len {
            return Err(Error::NotSquare { len });
        }
        let count = max_count.min(rows.len_of(Axis(0)));
        trace!("rendering {} images of {}x{}", count, side, side);

        let edge = self.config.image_cell * side as u32 + 4;
        let size = (edge * count.max(1) as u32, edge);
        self.record("images", size, |root| {
            if count == 0 {
                return Ok(());
            }
            let panels = root.split_evenly((1, count));
            for (panel, row) in panels.iter().zip(rows.outer_iter()) {
                draw_image(panel, row, side, max_intensity)?;
            }
            Ok(())
        })
    }

    fn show_scatter(&mut self, groups: &[ArrayView2<f32>], title: &str) -> Result<()> {
        for (class, group) in groups.iter().enumerate() {
            let cols = group.len_of(Axis(1));
            if cols != 2 {
                return Err(Error::NotTwoDimensional { class, cols });
            }
        }
        let x_range = axis_range(groups.iter().flat_map(|g| g.column(0).into_iter().copied()));
        let y_range = axis_range(groups.iter().flat_map(|g| g.column(1).into_iter().copied()));

        self.record("scatter", self.config.chart_size, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(title, ("sans-serif", 30))
                .margin(20)
                .x_label_area_size(40)
                .y_label_area_size(50)
                .build_cartesian_2d(x_range, y_range)?;
            chart.configure_mesh().draw()?;

            for (class, group) in groups.iter().enumerate() {
                let color = class_color(class);
                chart
                    .draw_series(
                        group
                            .outer_iter()
                            .filter(|p| p[0].is_finite() && p[1].is_finite())
                            .map(|p| Circle::new((p[0], p[1]), 3, color.filled())),
                    )?
                    .label(format!("y{}", class))
                    .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
            }

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
            Ok(())
        })
    }

    fn show_loss_curve(&mut self, values: &[f32]) -> Result<()> {
        let points: Vec<(usize, f32)> = values
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .collect();
        let last_epoch = values.len().saturating_sub(1).max(1);
        let y_range = axis_range(points.iter().map(|&(_, v)| v));

        self.record("loss", self.config.chart_size, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption("Train Loss", ("sans-serif", 30))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(70)
                .build_cartesian_2d(0usize..last_epoch, y_range)?;
            chart
                .configure_mesh()
                .x_desc("Epochs")
                .y_desc("Loss")
                .draw()?;
            chart.draw_series(LineSeries::new(points, &BLUE))?;
            Ok(())
        })
    }
}
