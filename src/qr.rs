use qrcode::{
    render::{svg, unicode},
    QrCode,
};

/// Inline SVG of `url`, for embedding in a page.
pub fn svg(url: &str) -> Result<String, qrcode::types::QrError> {
    let code = QrCode::new(url.as_bytes())?;
    Ok(code
        .render::<svg::Color<'_>>()
        .min_dimensions(240, 240)
        .dark_color(svg::Color("#111111"))
        .light_color(svg::Color("#ffffff"))
        .build())
}

/// Half-block rendering of `url` for the startup banner.
pub fn terminal(url: &str) -> Result<String, qrcode::types::QrError> {
    let code = QrCode::new(url.as_bytes())?;
    // Inverted so it scans on dark terminal backgrounds.
    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_is_an_svg_document() {
        let image = svg("http://192.168.1.20:8000").unwrap();
        assert!(image.contains("<svg"));
        assert!(image.contains("#111111"));
    }

    #[test]
    fn terminal_rendering_is_square_ish() {
        let text = terminal("http://192.168.1.20:8000").unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines.len() > 10);
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
    }
}
