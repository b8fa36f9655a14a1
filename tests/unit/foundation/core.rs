use super::*;

#[test]
fn surface_size_rejects_zero_dimensions() {
    assert!(SurfaceSize::new(0, 10).is_err());
    assert!(SurfaceSize::new(10, 0).is_err());
    let s = SurfaceSize::new(4, 3).unwrap();
    assert_eq!(s.pixel_count(), 12);
}

#[test]
fn straight_rgba_premultiplies() {
    let px = Rgba8Premul::from_straight_rgba(100, 50, 200, 128);
    assert_eq!(px.r, ((100u16 * 128 + 127) / 255) as u8);
    assert_eq!(px.g, ((50u16 * 128 + 127) / 255) as u8);
    assert_eq!(px.b, ((200u16 * 128 + 127) / 255) as u8);
    assert_eq!(px.a, 128);

    assert_eq!(Rgba8Premul::from_straight_rgba(10, 20, 30, 0).r, 0);
    assert_eq!(Rgba8Premul::transparent().a, 0);
}

#[test]
fn bitmap_validates_byte_length() {
    assert!(Bitmap::from_premul_rgba8(2, 2, vec![0u8; 16]).is_ok());
    assert!(Bitmap::from_premul_rgba8(2, 2, vec![0u8; 15]).is_err());
    assert!(Bitmap::from_premul_rgba8(0, 0, vec![]).is_err());
}

#[test]
fn bitmap_reads_are_bounds_checked() {
    let mut bytes = vec![0u8; 16];
    // pixel (1,0) = premul red at half alpha
    bytes[4..8].copy_from_slice(&[128, 0, 0, 128]);
    let bmp = Bitmap::from_premul_rgba8(2, 2, bytes).unwrap();

    assert_eq!(bmp.alpha_at(1, 0), Some(128));
    assert_eq!(bmp.alpha_at(0, 0), Some(0));
    assert_eq!(bmp.alpha_at(2, 0), None);
    assert_eq!(bmp.alpha_at(0, 2), None);
    assert_eq!(
        bmp.pixel_at(1, 0),
        Some(Rgba8Premul {
            r: 128,
            g: 0,
            b: 0,
            a: 128
        })
    );
}

#[test]
fn layer_id_display_matches_raw() {
    let id = LayerId::new("bolt");
    assert_eq!(id.as_str(), "bolt");
    assert_eq!(id.to_string(), "bolt");
    assert_eq!(LayerId::from("bolt"), id);
}
