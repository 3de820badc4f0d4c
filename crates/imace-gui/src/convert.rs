/// Convert a decoded image to an egui ColorImage (RGBA, unmultiplied).
pub fn to_color_image(image: &image::DynamicImage) -> egui::ColorImage {
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw())
}

/// Decode `bytes` and shrink so neither side exceeds `max_edge`.
pub fn decode_scaled(bytes: &[u8], max_edge: u32) -> image::ImageResult<egui::ColorImage> {
    let image = image::load_from_memory(bytes)?;
    let image = if image.width() > max_edge || image.height() > max_edge {
        image.thumbnail(max_edge, max_edge)
    } else {
        image
    };
    Ok(to_color_image(&image))
}
