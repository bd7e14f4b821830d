use super::*;

#[test]
fn geometry_rejects_zero_dimensions() {
    assert!(ScreenGeometry::new(0, 4).is_err());
    assert!(ScreenGeometry::new(4, 0).is_err());
    let g = ScreenGeometry::new(8, 4).unwrap();
    assert_eq!(g.sample_len().unwrap(), 8 * 4 * 4);
    assert_eq!(g.pixel_count(), 32);
}

#[test]
fn sample_index_matches_flat_layout() {
    let g = ScreenGeometry::new(8, 4).unwrap();
    assert_eq!(g.sample_index(0, 0), 0);
    assert_eq!(g.sample_index(1, 0), 4);
    assert_eq!(g.sample_index(0, 1), 32);
    assert_eq!(g.sample_index(7, 3), ((3 * 8) + 7) * 4);
}

#[test]
fn patch_bounds_are_inclusive() {
    let p = Patch::new(PixelPos::new(4, 0), PixelPos::new(7, 3)).unwrap();
    assert_eq!(p.width(), 4);
    assert_eq!(p.height(), 4);
    assert_eq!(p.pixel_count(), 16);
    assert!(p.contains(PixelPos::new(7, 3)));
    assert!(!p.contains(PixelPos::new(8, 3)));
    assert!(!p.contains(PixelPos::new(3, 0)));
    assert_eq!(p.to_string(), "(4, 0)-(7, 3)");
}

#[test]
fn patch_rejects_inverted_corners() {
    assert!(Patch::new(PixelPos::new(2, 0), PixelPos::new(1, 0)).is_err());
    assert!(Patch::new(PixelPos::new(0, 2), PixelPos::new(0, 1)).is_err());
    assert!(Patch::new(PixelPos::new(1, 1), PixelPos::new(1, 1)).is_ok());
}

#[test]
fn overlap_and_fit_checks() {
    let g = ScreenGeometry::new(8, 4).unwrap();
    let a = Patch::new(PixelPos::new(0, 0), PixelPos::new(3, 3)).unwrap();
    let b = Patch::new(PixelPos::new(4, 0), PixelPos::new(7, 3)).unwrap();
    let c = Patch::new(PixelPos::new(3, 2), PixelPos::new(4, 3)).unwrap();
    assert!(!a.overlaps(&b));
    assert!(a.overlaps(&c));
    assert!(b.overlaps(&c));
    assert!(a.fits(&g));
    let outside = Patch::new(PixelPos::new(6, 0), PixelPos::new(8, 3)).unwrap();
    assert!(!outside.fits(&g));
    assert_eq!(g.full_patch(), Patch::new(PixelPos::new(0, 0), PixelPos::new(7, 3)).unwrap());
}

#[test]
fn sampling_params_require_positive_counts() {
    assert!(SamplingParams::new(0, 1).is_err());
    assert!(SamplingParams::new(1, 0).is_err());
    assert_eq!(SamplingParams::default(), SamplingParams::new(1, 1).unwrap());
}
