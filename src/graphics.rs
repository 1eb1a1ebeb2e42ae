use image::{DynamicImage, imageops::FilterType};
use ratatui::{
  buffer::Buffer,
  layout::Rect,
  style::{Color, Style},
  widgets::Widget,
};

use crate::display::DisplayMode;

// --- Frame Preview Widget ---

/// Draws an already-resized keyframe centered in its area.
pub struct PreviewWidget<'a> {
  pub image: &'a DynamicImage,
  pub display_mode: DisplayMode,
}

const ASCII_RAMP: [&str; 10] = [" ", ".", ":", "-", "=", "+", "*", "#", "%", "@"];

impl Widget for PreviewWidget<'_> {
  fn render(self, area: Rect, buf: &mut Buffer) {
    if area.is_empty() {
      return;
    }
    match self.display_mode {
      DisplayMode::Direct => render_half_blocks(self.image, area, buf),
      DisplayMode::Ascii => render_ascii(self.image, area, buf),
    }
  }
}

/// Resize `image` to fit inside `area`, keeping its aspect ratio.
///
/// Half-block mode packs two pixel rows per cell, ASCII one; terminal cells
/// are roughly twice as tall as wide.
pub fn fit_to_area(image: &DynamicImage, area: Rect, mode: DisplayMode) -> DynamicImage {
  let max_w = u32::from(area.width).max(1);
  let rows_per_cell = match mode {
    DisplayMode::Direct => 2,
    DisplayMode::Ascii => 1,
  };
  let max_h = (u32::from(area.height) * rows_per_cell).max(1);
  // Stretch vertically for ASCII so one char row stands for two pixel rows.
  let source = match mode {
    DisplayMode::Direct => image.clone(),
    DisplayMode::Ascii => image.resize_exact(image.width(), (image.height() / 2).max(1), FilterType::Triangle),
  };
  source.resize(max_w, max_h, FilterType::Triangle)
}

fn cell_offset(area: Rect, used_w: u32, used_h: u32) -> (u16, u16) {
  let dx = (u32::from(area.width).saturating_sub(used_w) / 2).min(u32::from(u16::MAX)) as u16;
  let dy = (u32::from(area.height).saturating_sub(used_h) / 2).min(u32::from(u16::MAX)) as u16;
  (area.x.saturating_add(dx), area.y.saturating_add(dy))
}

fn render_half_blocks(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let rgb = image.to_rgb8();
  let w = rgb.width().min(u32::from(area.width));
  let h = rgb.height();
  let cells_h = h.div_ceil(2).min(u32::from(area.height));
  let (x0, y0) = cell_offset(area, w, cells_h);

  for cy in 0..cells_h {
    for x in 0..w {
      let top = rgb.get_pixel(x, cy * 2);
      let fg = Color::Rgb(top[0], top[1], top[2]);
      let bg = if cy * 2 + 1 < h {
        let bottom = rgb.get_pixel(x, cy * 2 + 1);
        Color::Rgb(bottom[0], bottom[1], bottom[2])
      } else {
        Color::Reset
      };
      buf.set_string(x0 + x as u16, y0 + cy as u16, "▀", Style::default().fg(fg).bg(bg));
    }
  }
}

fn render_ascii(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let luma = image.to_luma8();
  let w = luma.width().min(u32::from(area.width));
  let h = luma.height().min(u32::from(area.height));
  let (x0, y0) = cell_offset(area, w, h);

  for y in 0..h {
    for x in 0..w {
      buf.set_string(x0 + x as u16, y0 + y as u16, ramp_char(luma.get_pixel(x, y)[0]), Style::default());
    }
  }
}

fn ramp_char(level: u8) -> &'static str {
  let idx = (usize::from(level) * (ASCII_RAMP.len() - 1) + 127) / 255;
  ASCII_RAMP[idx.min(ASCII_RAMP.len() - 1)]
}
