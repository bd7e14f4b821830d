use super::*;

fn coverage(geometry: &ScreenGeometry, patches: &[Patch]) -> Vec<u32> {
    let mut hits = vec![0u32; geometry.pixel_count()];
    for p in patches {
        assert!(p.fits(geometry), "patch {p} exceeds frame");
        for y in p.rows() {
            for x in p.cols() {
                hits[(y * geometry.width + x) as usize] += 1;
            }
        }
    }
    hits
}

#[test]
fn eight_by_four_with_size_four_yields_two_patches() {
    let g = ScreenGeometry::new(8, 4).unwrap();
    let patches = plan_patches(&g, 4u32).unwrap();
    assert_eq!(
        patches,
        vec![
            Patch::new(PixelPos::new(0, 0), PixelPos::new(3, 3)).unwrap(),
            Patch::new(PixelPos::new(4, 0), PixelPos::new(7, 3)).unwrap(),
        ]
    );
    for p in &patches {
        assert!(p.end.x <= 7 && p.end.y <= 3);
    }
}

#[test]
fn partitions_frame_exactly_for_many_shapes() {
    for (w, h) in [(1, 1), (8, 4), (7, 5), (17, 3), (64, 1), (1, 64), (33, 29)] {
        let g = ScreenGeometry::new(w, h).unwrap();
        for size in [1u32, 2, 3, 4, 5, 8, 16, 100] {
            let patches = plan_patches(&g, size).unwrap();
            let hits = coverage(&g, &patches);
            assert!(
                hits.iter().all(|&n| n == 1),
                "{w}x{h} size {size} does not partition the frame"
            );
            let expected = w.div_ceil(size) * h.div_ceil(size);
            assert_eq!(patches.len(), expected as usize);
        }
    }
}

#[test]
fn last_row_and_column_are_clipped() {
    let g = ScreenGeometry::new(10, 7).unwrap();
    let patches = plan_patches(&g, 4u32).unwrap();
    assert_eq!(patches.len(), 6);
    assert_eq!(patches[2].start, PixelPos::new(8, 0));
    assert_eq!(patches[2].end, PixelPos::new(9, 3));
    assert_eq!(patches[5].start, PixelPos::new(8, 4));
    assert_eq!(patches[5].end, PixelPos::new(9, 6));
}

#[test]
fn oversized_patch_collapses_to_single_clipped_patch() {
    let g = ScreenGeometry::new(5, 3).unwrap();
    let patches = plan_patches(&g, 64u32).unwrap();
    assert_eq!(patches, vec![g.full_patch()]);

    let patches = plan_patches(&g, u32::MAX).unwrap();
    assert_eq!(patches, vec![g.full_patch()]);
}

#[test]
fn patches_are_row_major() {
    let g = ScreenGeometry::new(6, 6).unwrap();
    let patches = plan_patches(&g, 3u32).unwrap();
    let starts: Vec<_> = patches.iter().map(|p| (p.start.x, p.start.y)).collect();
    assert_eq!(starts, vec![(0, 0), (3, 0), (0, 3), (3, 3)]);
}

#[test]
fn row_strips_cover_one_row_each() {
    let g = ScreenGeometry::new(6, 3).unwrap();
    let patches = plan_patches(&g, PatchSize::rows(g.width)).unwrap();
    assert_eq!(patches.len(), 3);
    for (y, p) in patches.iter().enumerate() {
        assert_eq!(p.start, PixelPos::new(0, y as u32));
        assert_eq!(p.end, PixelPos::new(5, y as u32));
    }
}

#[test]
fn zero_patch_size_is_rejected() {
    let g = ScreenGeometry::new(4, 4).unwrap();
    assert!(plan_patches(&g, 0u32).is_err());
    assert!(
        plan_patches(
            &g,
            PatchSize {
                width: 2,
                height: 0
            }
        )
        .is_err()
    );
}
