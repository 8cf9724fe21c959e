use anyhow::{Context, Result};
use textsnip_types::{Bitmap, ScreenPoint, SelectionRect};
use xcap::Monitor;
use xcap::image::{RgbaImage, imageops};

fn monitor_rect(monitor: &Monitor) -> SelectionRect {
    SelectionRect::from_points(
        ScreenPoint::new(monitor.x(), monitor.y()),
        ScreenPoint::new(
            monitor.x() + monitor.width() as i32,
            monitor.y() + monitor.height() as i32,
        ),
    )
}

fn intersection(a: &SelectionRect, b: &SelectionRect) -> Option<SelectionRect> {
    let x1 = a.x1().max(b.x1());
    let y1 = a.y1().max(b.y1());
    let x2 = a.x2().min(b.x2());
    let y2 = a.y2().min(b.y2());
    (x1 < x2 && y1 < y2)
        .then(|| SelectionRect::from_points(ScreenPoint::new(x1, y1), ScreenPoint::new(x2, y2)))
}

fn union(rects: impl IntoIterator<Item = SelectionRect>) -> Option<SelectionRect> {
    rects.into_iter().reduce(|acc, r| {
        SelectionRect::from_points(
            ScreenPoint::new(acc.x1().min(r.x1()), acc.y1().min(r.y1())),
            ScreenPoint::new(acc.x2().max(r.x2()), acc.y2().max(r.y2())),
        )
    })
}

/// Bounding box of every monitor, in absolute screen pixels
pub fn virtual_screen() -> Result<SelectionRect> {
    let monitors = Monitor::all().context("Failed to get monitors")?;
    union(monitors.iter().map(monitor_rect)).context("No monitor found")
}

/// Capture an absolute screen rectangle.
///
/// Regions that straddle monitors are stitched together; parts that fall
/// outside every monitor stay transparent.
pub fn capture_screen_region(region: SelectionRect) -> Result<Bitmap> {
    let monitors = Monitor::all().context("Failed to get monitors")?;
    let mut canvas = RgbaImage::new(region.width(), region.height());
    let mut covered = false;

    for monitor in &monitors {
        let bounds = monitor_rect(monitor);
        let Some(part) = intersection(&bounds, &region) else {
            continue;
        };

        let image = monitor
            .capture_image()
            .with_context(|| format!("Failed to capture monitor at ({}, {})", bounds.x1(), bounds.y1()))?;

        let cropped = imageops::crop_imm(
            &image,
            (part.x1() - bounds.x1()) as u32,
            (part.y1() - bounds.y1()) as u32,
            part.width(),
            part.height(),
        )
        .to_image();

        imageops::replace(
            &mut canvas,
            &cropped,
            i64::from(part.x1() - region.x1()),
            i64::from(part.y1() - region.y1()),
        );
        covered = true;
    }

    anyhow::ensure!(
        covered,
        "Region at ({}, {}) is not on any monitor",
        region.x1(),
        region.y1()
    );

    let (width, height) = canvas.dimensions();
    Bitmap::from_rgba(width, height, canvas.into_raw()).context("Captured buffer has wrong size")
}
