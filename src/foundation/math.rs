pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Flatten premultiplied RGBA8 over an opaque background into packed RGB24.
pub(crate) fn flatten_premul_rgba8_to_rgb24(dst: &mut Vec<u8>, src_premul: &[u8], bg_rgb: [u8; 3]) {
    dst.clear();
    dst.reserve(src_premul.len() / 4 * 3);

    let bg = bg_rgb.map(u16::from);
    for s in src_premul.chunks_exact(4) {
        let a = u16::from(s[3]);
        if a == 255 {
            dst.extend_from_slice(&s[..3]);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let v = u16::from(s[c]) + mul_div255_u16(bg[c], inv);
            dst.push(v.min(255) as u8);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
