pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Convert straight-alpha RGBA8 in place to premultiplied RGBA8.
pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = mul_div255_u8(u16::from(px[0]), a);
        px[1] = mul_div255_u8(u16::from(px[1]), a);
        px[2] = mul_div255_u8(u16::from(px[2]), a);
    }
}

/// Composite one premultiplied pixel, scaled by `opacity`, over an opaque straight-alpha
/// background. The result is opaque.
pub(crate) fn over_opaque(src: [u8; 4], opacity: f32, bg: [u8; 3]) -> [u8; 4] {
    let k = (opacity.clamp(0.0, 1.0) * 255.0).round() as u16;
    let sa = mul_div255_u16(u16::from(src[3]), k);
    let inv = 255 - sa;
    let ch = |s: u8, b: u8| -> u8 {
        let v = mul_div255_u16(u16::from(s), k) + mul_div255_u16(u16::from(b), inv);
        v.min(255) as u8
    };
    [ch(src[0], bg[0]), ch(src[1], bg[1]), ch(src[2], bg[2]), 255]
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
