#![cfg(not(tarpaulin_include))]
#![cfg(feature = "web")]
use crate::error::{DashboardError, Result};
use crate::report::CategoryCount;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::io::Cursor;

/// Chart kinds shown in the report section
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphType {
    /// One bar per disability category
    Bar,

    /// Share of each disability category
    Pie,
}

/// Configuration options for graph generation
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Title displayed at the top of the graph
    pub title: String,

    /// Label for the X-axis (bar chart only)
    pub x_label: String,

    /// Label for the Y-axis (bar chart only)
    pub y_label: String,

    /// Width of the graph in pixels
    pub width: u32,

    /// Height of the graph in pixels
    pub height: u32,

    /// Type of graph to generate
    pub graph_type: GraphType,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            title: "Penyandang Disabilitas".to_string(),
            x_label: "Jenis Disabilitas".to_string(),
            y_label: "Jumlah".to_string(),
            width: 640,
            height: 420,
            graph_type: GraphType::Bar,
        }
    }
}

impl GraphOptions {
    pub fn bar() -> Self {
        Self {
            title: "Grafik Batang".to_string(),
            ..Self::default()
        }
    }

    pub fn pie() -> Self {
        Self {
            title: "Distribusi Jenis Disabilitas".to_string(),
            graph_type: GraphType::Pie,
            ..Self::default()
        }
    }
}

/// One wedge of the pie chart.
#[derive(Clone, Debug, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub jumlah: usize,
    /// Fraction of the total, in `0.0..=1.0`
    pub share: f64,
}

/// Turn category counts into pie wedges, dropping empty categories.
pub fn pie_slices(counts: &[CategoryCount]) -> Vec<PieSlice> {
    let total: usize = counts.iter().map(|c| c.jumlah).sum();
    if total == 0 {
        return Vec::new();
    }
    counts
        .iter()
        .filter(|c| c.jumlah > 0)
        .map(|c| PieSlice {
            label: c.jenis_disabilitas.clone(),
            jumlah: c.jumlah,
            share: c.jumlah as f64 / total as f64,
        })
        .collect()
}

const SLICE_COLORS: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
];

/// Render a category chart as PNG bytes
///
/// # Arguments
/// * `counts` - Output of [`crate::report::count_by_category`]
/// * `options` - Graph styling and type options
pub fn create_graph(counts: &[CategoryCount], options: &GraphOptions) -> Result<Vec<u8>> {
    let rendered = match options.graph_type {
        GraphType::Bar => render_png(options, |root| draw_bar_chart(root, counts, options)),
        GraphType::Pie => render_png(options, |root| draw_pie_chart(root, counts, options)),
    };
    rendered.map_err(|e| DashboardError::Chart(e.to_string()))
}

pub fn render_bar_chart(counts: &[CategoryCount], options: &GraphOptions) -> Result<Vec<u8>> {
    create_graph(
        counts,
        &GraphOptions {
            graph_type: GraphType::Bar,
            ..options.clone()
        },
    )
}

pub fn render_pie_chart(counts: &[CategoryCount], options: &GraphOptions) -> Result<Vec<u8>> {
    create_graph(
        counts,
        &GraphOptions {
            graph_type: GraphType::Pie,
            ..options.clone()
        },
    )
}

/// Draw into an in-memory RGB buffer and encode it as PNG.
fn render_png<F>(options: &GraphOptions, draw: F) -> std::result::Result<Vec<u8>, Box<dyn Error>>
where
    F: FnOnce(&DrawingArea<BitMapBackend, Shift>) -> std::result::Result<(), Box<dyn Error>>,
{
    let (width, height) = (options.width, options.height);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }

    let image = image::RgbImage::from_raw(width, height, buffer)
        .ok_or("chart buffer does not match its dimensions")?;
    let mut png = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image).write_to(&mut png, image::ImageOutputFormat::Png)?;
    Ok(png.into_inner())
}

fn draw_bar_chart(
    root: &DrawingArea<BitMapBackend, Shift>,
    counts: &[CategoryCount],
    options: &GraphOptions,
) -> std::result::Result<(), Box<dyn Error>> {
    let labels: Vec<&str> = counts.iter().map(|c| c.jenis_disabilitas.as_str()).collect();
    let bars = labels.len().max(1) as u32;
    let max_y = counts.iter().map(|c| c.jumlah).max().unwrap_or(0) as u32;

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0..bars).into_segmented(), 0u32..max_y + 1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars as usize)
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).unwrap_or(&"").to_string(),
            _ => String::new(),
        })
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(SLICE_COLORS[0].filled())
            .margin(12)
            .data(
                counts
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (i as u32, c.jumlah as u32)),
            ),
    )?;

    Ok(())
}

fn draw_pie_chart(
    root: &DrawingArea<BitMapBackend, Shift>,
    counts: &[CategoryCount],
    options: &GraphOptions,
) -> std::result::Result<(), Box<dyn Error>> {
    let area = root.titled(&options.title, ("sans-serif", 24))?;
    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);

    let slices = pie_slices(counts);
    if slices.is_empty() {
        area.draw(&Text::new(
            "Tidak ada data",
            (center.0 - 60, center.1),
            ("sans-serif", 20).into_font(),
        ))?;
        return Ok(());
    }

    let radius = w.min(h) as f64 * 0.35;
    let sizes: Vec<f64> = slices.iter().map(|s| s.jumlah as f64).collect();
    let colors: Vec<RGBColor> = (0..slices.len())
        .map(|i| SLICE_COLORS[i % SLICE_COLORS.len()])
        .collect();
    let labels: Vec<String> = slices.iter().map(|s| s.label.clone()).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 14).into_font().color(&WHITE));
    area.draw(&pie)?;

    Ok(())
}
