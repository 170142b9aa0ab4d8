use crate::error::{LevitationError, Result};
use crate::pressure::PressureField;
use ndarray::{Array1, Array2};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

const COLORBAR_WIDTH: u32 = 220;
const COLORBAR_STEPS: usize = 128;
const COLORBAR_LABEL: &str = "Acoustic pressure (Pa)";

type Segment = ((f64, f64), (f64, f64));
type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;
type FieldChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Writes pressure-field images with a jet-like colormap.
pub struct FieldVisualiser {
    width: u32,
    height: u32,
    gradient: Box<dyn colorgrad::Gradient>,
}

impl FieldVisualiser {
    pub fn new(output_dir: &str, width: u32, height: u32) -> Result<Self> {
        std::fs::create_dir_all(output_dir).map_err(|e| {
            LevitationError::Render(format!("cannot create '{}': {}", output_dir, e))
        })?;

        Ok(Self {
            width,
            height,
            gradient: Box::new(colorgrad::preset::turbo()),
        })
    }

    /// Filled contour plot with `n_levels` levels plus black iso-lines.
    pub fn plot_contour(&self, field: &PressureField, n_levels: usize, path: &Path) -> Result<()> {
        self.draw_contour(field, n_levels, path)
            .map_err(|e| LevitationError::Render(e.to_string()))?;
        tracing::info!("Saved contour plot: {}", path.display());
        Ok(())
    }

    /// Continuously shaded plot clamped to the symmetric colour limits.
    pub fn plot_continuous(&self, field: &PressureField, path: &Path) -> Result<()> {
        self.draw_continuous(field, path)
            .map_err(|e| LevitationError::Render(e.to_string()))?;
        tracing::info!("Saved continuous plot: {}", path.display());
        Ok(())
    }

    fn draw_contour(&self, field: &PressureField, n_levels: usize, path: &Path) -> DrawResult {
        let levels = field.contour_levels(n_levels);
        let real = field.real();
        let bands = n_levels.saturating_sub(1).max(1);

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;
        let (plot_area, bar_area) = root.split_horizontally(self.plot_width());

        let title = format!("Pressure distribution, {} contours", n_levels);
        self.draw_cells(
            &plot_area,
            field,
            &real,
            &title,
            |v| self.color(band_fraction(band_index(&levels, v), bands)),
            |chart| draw_iso_lines(chart, field, &real, &levels),
        )?;

        let (lo, hi) = field.color_limits();
        self.draw_colorbar(&bar_area, lo, hi, bands)?;

        root.present()?;
        Ok(())
    }

    fn draw_continuous(&self, field: &PressureField, path: &Path) -> DrawResult {
        let (lo, hi) = field.color_limits();
        let real = field.real();

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;
        let (plot_area, bar_area) = root.split_horizontally(self.plot_width());

        self.draw_cells(
            &plot_area,
            field,
            &real,
            "Pressure distribution, continuous",
            |v| self.color(normalize(v, lo, hi)),
            |_| Ok(()),
        )?;
        self.draw_colorbar(&bar_area, lo, hi, COLORBAR_STEPS)?;

        root.present()?;
        Ok(())
    }

    /// Paints one rectangle per grid sample, then hands the chart to `overlay`.
    fn draw_cells<DB, C, O>(
        &self,
        area: &DrawingArea<DB, Shift>,
        field: &PressureField,
        real: &Array2<f64>,
        title: &str,
        color_of: C,
        overlay: O,
    ) -> DrawResult
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
        C: Fn(f64) -> RGBColor,
        O: FnOnce(&mut FieldChart<'_, DB>) -> DrawResult,
    {
        let x_edges = cell_edges(&field.x);
        let z_edges = cell_edges(&field.z);
        let (nz, nx) = real.dim();

        let mut chart = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 30))
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_edges[0]..x_edges[nx], z_edges[0]..z_edges[nz])?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc("X (m)")
            .y_desc("Z (m)")
            .x_label_formatter(&|v| format!("{:.3}", v))
            .y_label_formatter(&|v| format!("{:.3}", v))
            .draw()?;

        self.paint_cells(&mut chart, field, real, color_of)?;
        overlay(&mut chart)
    }

    /// One filled rectangle per grid sample, coloured by `color_of`.
    fn paint_cells<DB, C>(
        &self,
        chart: &mut FieldChart<'_, DB>,
        field: &PressureField,
        real: &Array2<f64>,
        color_of: C,
    ) -> DrawResult
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
        C: Fn(f64) -> RGBColor,
    {
        let x_edges = cell_edges(&field.x);
        let z_edges = cell_edges(&field.z);
        let (nz, nx) = real.dim();

        chart.draw_series((0..nz).flat_map(|k| (0..nx).map(move |j| (k, j))).map(|(k, j)| {
            Rectangle::new(
                [(x_edges[j], z_edges[k]), (x_edges[j + 1], z_edges[k + 1])],
                color_of(real[[k, j]]).filled(),
            )
        }))?;
        Ok(())
    }

    fn draw_colorbar<DB>(
        &self,
        area: &DrawingArea<DB, Shift>,
        lo: f64,
        hi: f64,
        steps: usize,
    ) -> DrawResult
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 1.0, lo + 1.0) };
        let steps = steps.max(1);
        let delta = (hi - lo) / steps as f64;

        let mut chart = ChartBuilder::on(area)
            .margin(10)
            .margin_top(50)
            .margin_bottom(60)
            .set_label_area_size(LabelAreaPosition::Right, 140)
            .build_cartesian_2d(0.0..1.0, lo..hi)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_desc(COLORBAR_LABEL)
            .y_label_formatter(&|v| format!("{:.0}", v))
            .draw()?;

        chart.draw_series((0..steps).map(|s| {
            let z0 = lo + s as f64 * delta;
            Rectangle::new(
                [(0.0, z0), (1.0, z0 + delta)],
                self.color(band_fraction(s, steps)).filled(),
            )
        }))?;
        Ok(())
    }

    fn plot_width(&self) -> i32 {
        self.width.saturating_sub(COLORBAR_WIDTH) as i32
    }

    fn color(&self, t: f64) -> RGBColor {
        let rgba = self.gradient.at(t.clamp(0.0, 1.0) as f32).to_rgba8();
        RGBColor(rgba[0], rgba[1], rgba[2])
    }
}

fn draw_iso_lines<DB>(
    chart: &mut FieldChart<'_, DB>,
    field: &PressureField,
    real: &Array2<f64>,
    levels: &Array1<f64>,
) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    for &level in levels.iter() {
        let segments = iso_segments(&field.x, &field.z, real, level);
        chart.draw_series(
            segments
                .into_iter()
                .map(|(a, b)| PathElement::new(vec![a, b], BLACK.stroke_width(1))),
        )?;
    }
    Ok(())
}

/// Position of `value` within `[lo, hi]`, clamped to `[0, 1]`.
pub fn normalize(value: f64, lo: f64, hi: f64) -> f64 {
    let t = if hi > lo {
        (value - lo) / (hi - lo)
    } else {
        0.5
    };
    t.clamp(0.0, 1.0)
}

/// Contour band of `value`; values outside the levels fall into the end bands.
pub fn band_index(levels: &Array1<f64>, value: f64) -> usize {
    let bands = levels.len().saturating_sub(1);
    if bands == 0 {
        return 0;
    }
    let above = levels.iter().take_while(|&&level| level <= value).count();
    above.saturating_sub(1).min(bands - 1)
}

/// Colormap position of band `band` out of `bands`, taken at the band centre.
pub fn band_fraction(band: usize, bands: usize) -> f64 {
    if bands == 0 {
        return 0.5;
    }
    (band as f64 + 0.5) / bands as f64
}

/// Rectangle edges around each sample: midpoints inside, half a spacing past the ends.
pub fn cell_edges(coords: &Array1<f64>) -> Vec<f64> {
    let n = coords.len();
    match n {
        0 => vec![0.0, 1.0],
        1 => vec![coords[0] - 0.5, coords[0] + 0.5],
        _ => {
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(coords[0] - 0.5 * (coords[1] - coords[0]));
            for i in 0..n - 1 {
                edges.push(0.5 * (coords[i] + coords[i + 1]));
            }
            edges.push(coords[n - 1] + 0.5 * (coords[n - 1] - coords[n - 2]));
            edges
        }
    }
}

/// Iso-line segments of `values` (rows = z, columns = x) at `level`, by marching squares.
pub fn iso_segments(
    x: &Array1<f64>,
    z: &Array1<f64>,
    values: &Array2<f64>,
    level: f64,
) -> Vec<Segment> {
    let (nz, nx) = values.dim();
    let mut segments = Vec::new();
    if nx < 2 || nz < 2 {
        return segments;
    }

    for k in 0..nz - 1 {
        for j in 0..nx - 1 {
            // Corners counter-clockwise from bottom-left
            let corners = [
                (x[j], z[k], values[[k, j]]),
                (x[j + 1], z[k], values[[k, j + 1]]),
                (x[j + 1], z[k + 1], values[[k + 1, j + 1]]),
                (x[j], z[k + 1], values[[k + 1, j]]),
            ];

            let mut crossings = Vec::with_capacity(4);
            for e in 0..4 {
                let (xa, za, va) = corners[e];
                let (xb, zb, vb) = corners[(e + 1) % 4];
                if (va < level) != (vb < level) {
                    let t = (level - va) / (vb - va);
                    crossings.push((xa + t * (xb - xa), za + t * (zb - za)));
                }
            }

            for pair in crossings.chunks_exact(2) {
                segments.push((pair[0], pair[1]));
            }
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use num_complex::Complex64;

    #[test]
    fn test_normalize_clamps() {
        assert_eq!(normalize(0.0, -2.0, 2.0), 0.5);
        assert_eq!(normalize(-5.0, -2.0, 2.0), 0.0);
        assert_eq!(normalize(5.0, -2.0, 2.0), 1.0);
        assert_eq!(normalize(1.0, 3.0, 3.0), 0.5);
    }

    #[test]
    fn test_band_index_extends_both_ends() {
        let levels = array![-2.0, -1.0, 0.0, 1.0, 2.0];
        assert_eq!(band_index(&levels, -10.0), 0);
        assert_eq!(band_index(&levels, -1.5), 0);
        assert_eq!(band_index(&levels, -0.5), 1);
        assert_eq!(band_index(&levels, 0.0), 2);
        assert_eq!(band_index(&levels, 1.99), 3);
        assert_eq!(band_index(&levels, 10.0), 3);
    }

    #[test]
    fn test_band_fraction_centres() {
        assert_eq!(band_fraction(0, 4), 0.125);
        assert_eq!(band_fraction(3, 4), 0.875);
    }

    #[test]
    fn test_cell_edges() {
        let edges = cell_edges(&array![0.0, 1.0, 3.0]);
        assert_eq!(edges, vec![-0.5, 0.5, 2.0, 4.0]);
    }

    #[test]
    fn test_iso_segments_vertical_line() {
        // Value equals x, so the level 0.5 contour is the line x = 0.5
        let x = array![0.0, 1.0, 2.0];
        let z = array![0.0, 1.0, 2.0];
        let values = Array2::from_shape_fn((3, 3), |(_, j)| x[j]);
        let segments = iso_segments(&x, &z, &values, 0.5);
        assert_eq!(segments.len(), 2);
        for (a, b) in segments {
            assert_relative_eq!(a.0, 0.5);
            assert_relative_eq!(b.0, 0.5);
        }
    }

    #[test]
    fn test_field_paints_into_bitmap_without_text() {
        // Cells and iso-lines only; captions and axis labels need a system font
        let x = array![-1.0, 0.0, 1.0, 2.0];
        let z = array![0.0, 1.0, 2.0];
        let p = Array1::from_shape_fn(12, |q| Complex64::new(q as f64 - 6.0, 0.0));
        let field = PressureField::from_vector(&p, &x, &z).unwrap();
        let real = field.real();
        let (lo, hi) = field.color_limits();
        let levels = field.contour_levels(4);

        let dir = tempfile::tempdir().unwrap();
        let visualiser = FieldVisualiser::new(dir.path().to_str().unwrap(), 64, 48).unwrap();
        let mut buffer = vec![255u8; 64 * 48 * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (64, 48)).into_drawing_area();
            let x_edges = cell_edges(&field.x);
            let z_edges = cell_edges(&field.z);
            let mut chart = ChartBuilder::on(&root)
                .build_cartesian_2d(x_edges[0]..x_edges[4], z_edges[0]..z_edges[3])
                .unwrap();
            visualiser
                .paint_cells(&mut chart, &field, &real, |v| {
                    visualiser.color(normalize(v, lo, hi))
                })
                .unwrap();
            draw_iso_lines(&mut chart, &field, &real, &levels).unwrap();
            root.present().unwrap();
        }

        // Lowest value sits in the bottom-left cell and is clamped to the cold end
        let cold = visualiser.color(0.0);
        let bottom_left = (46 * 64 + 1) * 3;
        assert_eq!(
            &buffer[bottom_left..bottom_left + 3],
            &[cold.0, cold.1, cold.2]
        );
        assert!(buffer.chunks_exact(3).any(|px| px == [0, 0, 0]));
    }

    #[test]
    fn test_iso_segments_none_outside_range() {
        let x = array![0.0, 1.0];
        let z = array![0.0, 1.0];
        let values = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(iso_segments(&x, &z, &values, 10.0).is_empty());
    }
}
