use std::path::Path;

use crate::color::Rgb;
use crate::config::TreemapConfig;
use crate::error::{Error, Result};
use crate::layout::Frame;
use crate::treemap::Rect;

pub fn to_csv(frame: &Frame, mut w: impl std::io::Write) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(&mut w);
    writer.write_record([
        "id", "label", "depth", "x", "y", "width", "height", "fill", "foreground", "scale", "visible",
    ])?;
    for n in &frame.nodes {
        writer.write_record([
            n.id.0.to_string(),
            n.label.clone(),
            n.depth.to_string(),
            format!("{:.3}", n.rect.x),
            format!("{:.3}", n.rect.y),
            format!("{:.3}", n.rect.w),
            format!("{:.3}", n.rect.h),
            n.shade.fill.css(),
            n.shade.foreground.css(),
            format!("{:.3}", n.fit.scale),
            n.fit.visible.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_json(frame: &Frame) -> serde_json::Value {
    serde_json::json!({
        "active": frame.active.0,
        "trail": frame.trail,
        "viewport": frame.viewport,
        "nodes": frame.nodes.iter().map(|n| serde_json::json!({
            "id": n.id.0,
            "label": n.label,
            "depth": n.depth,
            "rect": n.rect,
            "fill": n.shade.fill.css(),
            "foreground": n.shade.foreground.css(),
            "scale": n.fit.scale,
            "visible": n.fit.visible,
            "drillable": n.drillable,
        })).collect::<Vec<_>>()
    })
}

// CSS pixels at 96 dpi
const MM_PER_PX: f64 = 25.4 / 96.0;
const PT_PER_PX: f64 = 0.75;

/// Draw the frame as filled rectangles on a single page sized to the viewport.
pub fn to_pdf(frame: &Frame, config: &TreemapConfig, out: &Path) -> Result<()> {
    use printpdf::path::PaintMode;
    use printpdf::{BuiltinFont, Color, Mm, PdfDocument, PdfLayerReference, Rect as PdfRect, Rgb as PdfRgb};

    let origin = frame.viewport;
    let mm = |px: f64| Mm((px * MM_PER_PX) as f32);
    // pdf y grows upward
    let flip = |y: f64| origin.h - (y - origin.y);
    let page_rect = |r: &Rect| {
        PdfRect::new(
            mm(r.x - origin.x),
            mm(flip(r.bottom())),
            mm(r.right() - origin.x),
            mm(flip(r.y)),
        )
    };
    let fill = |layer: &PdfLayerReference, rgb: Rgb| {
        layer.set_fill_color(Color::Rgb(PdfRgb::new(
            f32::from(rgb.0) / 255.0,
            f32::from(rgb.1) / 255.0,
            f32::from(rgb.2) / 255.0,
            None,
        )));
    };

    let (doc, page1, layer1) = PdfDocument::new("Treemap", mm(origin.w), mm(origin.h), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| Error::Pdf(e.to_string()))?;

    let bar = frame.toolbar;
    fill(&layer, frame.toolbar_shade.fill.to_rgb());
    layer.add_rect(page_rect(&bar).with_mode(PaintMode::Fill));
    fill(&layer, frame.toolbar_shade.foreground);
    layer.use_text(
        frame.trail.clone(),
        (config.font_size * PT_PER_PX) as f32,
        mm(bar.x - origin.x + config.margin),
        mm(flip(bar.y + (bar.h + config.font_size) / 2.0)),
        &font,
    );

    for n in &frame.nodes {
        fill(&layer, n.shade.fill.to_rgb());
        layer.add_rect(page_rect(&n.rect).with_mode(PaintMode::FillStroke));
        if n.fit.visible && !n.label.is_empty() {
            let (ax, ay) = n.fit.anchor(&n.rect, config);
            fill(&layer, n.shade.foreground);
            layer.use_text(
                n.label.clone(),
                (n.fit.font_size(config) * PT_PER_PX) as f32,
                mm(ax - origin.x),
                mm(flip(ay)),
                &font,
            );
        }
    }

    let file = std::fs::File::create(out).map_err(|e| Error::io(out, e))?;
    let mut buf = std::io::BufWriter::new(file);
    doc.save(&mut buf).map_err(|e| Error::Pdf(e.to_string()))?;
    tracing::debug!(path = %out.display(), nodes = frame.len(), "wrote pdf");
    Ok(())
}
