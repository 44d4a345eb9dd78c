use anyhow::Result;
use plotters::element::Pie;
use plotters::prelude::*;
use std::path::Path;
use tracing::warn;

/// Two-slice palette shared by both charts.
pub const PALETTE: [RGBColor; 2] = [RGBColor(0x1f, 0x77, 0xb4), RGBColor(0xff, 0x7f, 0x0e)];

const SIZE: (u32, u32) = (800, 600);

/// Render a two-slice pie chart to a PNG at `path`.
///
/// Returns `Ok(false)` without touching `path` when there is nothing to draw.
pub fn render_pie(path: &Path, title: &str, labels: [&str; 2], values: [f64; 2]) -> Result<bool> {
    if values.iter().sum::<f64>() <= 0.0 {
        warn!(path = %path.display(), "all slices are zero, skipping chart");
        return Ok(false);
    }

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(title, ("sans-serif", 30))?;

    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.35;

    let mut pie = Pie::new(&center, &radius, &values, &PALETTE, &labels);
    pie.start_angle(90.0);
    pie.label_style(("sans-serif", 22).into_font().color(&BLACK));
    pie.percentages(("sans-serif", radius * 0.1).into_font().color(&WHITE));
    area.draw(&pie)?;

    root.present()?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_renders_png() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("status.png");
        let drawn = render_pie(&path, "Status", ["Open", "Closed"], [3.0, 5.0]).unwrap();
        assert!(drawn);
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_single_slice_renders() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("violation.png");
        assert!(render_pie(&path, "All", ["Violation", "No Violation"], [0.0, 4.0]).unwrap());
        assert!(path.exists());
    }

    #[test]
    fn test_zero_values_skip_rendering() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("empty.png");
        let drawn = render_pie(&path, "Nothing", ["A", "B"], [0.0, 0.0]).unwrap();
        assert!(!drawn);
        assert!(!path.exists());
    }
}
