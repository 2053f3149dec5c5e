use std::f64::consts::{FRAC_PI_4, PI};

use gnomonic::sphere::{panorama_direction, Aperture};
use gnomonic::{
    project_forward, project_forward_blend, project_inverse, ForwardParams, ImageView,
    ImageViewMut, InverseParams, Interpolation, Orientation,
};
use image::{imageops, Rgb, RgbImage};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("warn").try_init();
}

fn gradient_source(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| Rgb([(2 * x + 40) as u8, (2 * y + 40) as u8, 128]))
}

/// 5x3 panorama: columns at longitude 0, pi/2, pi, 3pi/2, 2pi; rows at -pi/2, 0, pi/2.
#[test]
fn test_single_white_pixel_lands_where_the_camera_looks() {
    init_tracing();
    let src = RgbImage::from_pixel(2, 2, Rgb([255, 255, 255]));
    let aperture = Aperture::new(FRAC_PI_4, FRAC_PI_4).unwrap();

    // Looking at longitude pi: only the centre pixel is visible.
    let mut pano = RgbImage::new(5, 3);
    let params = ForwardParams {
        orientation: Orientation::new(PI, 0.),
        aperture,
    };
    let written = project_forward(
        &mut ImageViewMut::from_image(&mut pano).unwrap(),
        &ImageView::from_image(&src).unwrap(),
        &params,
        &Interpolation::Nearest,
    )
    .unwrap();
    assert_eq!(written, 1);
    for (x, y, px) in pano.enumerate_pixels() {
        let expected = if (x, y) == (2, 1) { [255; 3] } else { [0; 3] };
        assert_eq!(px.0, expected, "pixel ({x}, {y})");
    }

    // Looking at longitude 0: both seam columns of the equator row light up.
    let mut pano = RgbImage::new(5, 3);
    let params = ForwardParams {
        orientation: Orientation::new(0., 0.),
        aperture,
    };
    let written = project_forward(
        &mut ImageViewMut::from_image(&mut pano).unwrap(),
        &ImageView::from_image(&src).unwrap(),
        &params,
        &Interpolation::Nearest,
    )
    .unwrap();
    assert_eq!(written, 2);
    assert_eq!(pano.get_pixel(0, 1).0, [255; 3]);
    assert_eq!(pano.get_pixel(4, 1).0, [255; 3]);
    assert_eq!(pano.get_pixel(2, 1).0, [0; 3]);
}

#[test]
fn test_back_hemisphere_is_never_written() {
    init_tracing();
    let (w, h) = (96usize, 48usize);
    let src = [255u8; 8 * 8 * 3];
    let src = ImageView::new(&src, 8, 8, 3).unwrap();

    for &(yaw, pitch) in &[(0.0, 0.0), (1.3, 0.4), (3.5, -1.2), (5.9, 1.5)] {
        let orientation = Orientation::new(yaw, pitch);
        let params = ForwardParams {
            orientation,
            aperture: Aperture::new(1.5, 1.5).unwrap(),
        };
        // RGBA with a sentinel alpha, which must survive as well
        let mut pano = vec![0u8; w * h * 4];
        for px in pano.chunks_exact_mut(4) {
            px[3] = 77;
        }
        project_forward(
            &mut ImageViewMut::new(&mut pano, w, h, 4).unwrap(),
            &src,
            &params,
            &Interpolation::Bilinear,
        )
        .unwrap();

        let to_camera = orientation.to_camera();
        let mut front = 0;
        for row in 0..h {
            for col in 0..w {
                let px = &pano[4 * (w * row + col)..][..4];
                assert_eq!(px[3], 77);
                let local = to_camera * panorama_direction(col, row, w, h);
                if local.x <= 0. {
                    assert_eq!(px[..3], [0, 0, 0], "({col}, {row}) behind camera");
                } else if px[0] == 255 {
                    front += 1;
                }
            }
        }
        assert!(front > 0);
    }
}

#[test]
fn test_blend_with_empty_mask_changes_nothing() {
    init_tracing();
    let src = gradient_source(32, 24);
    let mask = [0u8; 32 * 24];
    let seed = RgbImage::from_fn(120, 60, |x, y| Rgb([x as u8, y as u8, 7]));
    let params = ForwardParams {
        orientation: Orientation::new(2.0, -0.3),
        aperture: Aperture::new(0.7, 0.5).unwrap(),
    };

    let mut pano = seed.clone();
    let written = project_forward_blend(
        &mut ImageViewMut::from_image(&mut pano).unwrap(),
        &ImageView::from_image(&src).unwrap(),
        &ImageView::new(&mask, 32, 24, 1).unwrap(),
        &params,
        &Interpolation::Bilinear,
    )
    .unwrap();
    assert!(written > 0);
    assert_eq!(pano, seed);
}

#[test]
fn test_blend_with_full_mask_matches_plain_projection() {
    init_tracing();
    let src = gradient_source(32, 24);
    let mask = [255u8; 32 * 24];
    let seed = RgbImage::from_fn(120, 60, |x, y| Rgb([x as u8, y as u8, 7]));
    let params = ForwardParams {
        orientation: Orientation::new(0.4, 0.6),
        aperture: Aperture::new(0.7, 0.5).unwrap(),
    };

    let mut plain = seed.clone();
    let plain_written = project_forward(
        &mut ImageViewMut::from_image(&mut plain).unwrap(),
        &ImageView::from_image(&src).unwrap(),
        &params,
        &Interpolation::Bicubic,
    )
    .unwrap();

    let mut blended = seed.clone();
    let blend_written = project_forward_blend(
        &mut ImageViewMut::from_image(&mut blended).unwrap(),
        &ImageView::from_image(&src).unwrap(),
        &ImageView::new(&mask, 32, 24, 1).unwrap(),
        &params,
        &Interpolation::Bicubic,
    )
    .unwrap();

    assert_eq!(plain_written, blend_written);
    assert_eq!(plain, blended);
    assert_ne!(plain, seed);
}

#[test]
fn test_half_mask_mixes_linearly() {
    init_tracing();
    let src = RgbImage::from_pixel(16, 16, Rgb([200, 200, 200]));
    let mask = [128u8; 16 * 16];
    let mut pano = RgbImage::from_pixel(80, 40, Rgb([100, 100, 100]));
    let params = ForwardParams {
        orientation: Orientation::new(PI, 0.),
        aperture: Aperture::new(0.6, 0.6).unwrap(),
    };
    let written = project_forward_blend(
        &mut ImageViewMut::from_image(&mut pano).unwrap(),
        &ImageView::from_image(&src).unwrap(),
        &ImageView::new(&mask, 16, 16, 1).unwrap(),
        &params,
        &Interpolation::Nearest,
    )
    .unwrap();

    // 100 * 127/255 + 200 * 128/255 = 150.19
    let mixed = pano.pixels().filter(|p| p.0 == [150; 3]).count();
    let untouched = pano.pixels().filter(|p| p.0 == [100; 3]).count();
    assert_eq!(mixed, written);
    assert_eq!(mixed + untouched, 80 * 40);
}

/// Forward-project a photo, then render it back out of a crop of the panorama.
#[test]
fn test_forward_then_inverse_recovers_source() {
    init_tracing();
    let (pan_w, pan_h) = (720u32, 360u32);
    let (win_x, win_y, win_w, win_h) = (280u32, 100u32, 160u32, 160u32);
    let aperture = Aperture::from_window(
        win_w as usize,
        win_h as usize,
        pan_w as usize,
        pan_h as usize,
    )
    .unwrap();

    let src = gradient_source(64, 64);
    let mut pano = RgbImage::new(pan_w, pan_h);
    let params = ForwardParams {
        orientation: Orientation::new(PI, 0.),
        aperture,
    };
    project_forward(
        &mut ImageViewMut::from_image(&mut pano).unwrap(),
        &ImageView::from_image(&src).unwrap(),
        &params,
        &Interpolation::Bilinear,
    )
    .unwrap();

    let window = imageops::crop_imm(&pano, win_x, win_y, win_w, win_h).to_image();
    let mut tile = RgbImage::new(64, 64);
    let inverse = InverseParams {
        panorama_width: pan_w as usize,
        panorama_height: pan_h as usize,
        window_x: win_x as usize,
        window_y: win_y as usize,
        sensor_x: 360.,
        sensor_y: 180.,
    };
    project_inverse(
        &mut ImageViewMut::from_image(&mut tile).unwrap(),
        &ImageView::from_image(&window).unwrap(),
        &inverse,
        &Interpolation::Bilinear,
    )
    .unwrap();

    let mut worst = 0;
    for y in 8..56 {
        for x in 8..56 {
            let want = src.get_pixel(x, y).0;
            let got = tile.get_pixel(x, y).0;
            for c in 0..3 {
                worst = worst.max((i32::from(want[c]) - i32::from(got[c])).abs());
            }
        }
    }
    assert!(worst <= 6, "worst channel error {worst}");
}

#[test]
fn test_inverse_skips_pixels_outside_window() {
    init_tracing();
    // Window far to the right of where the tile looks.
    let window = RgbImage::from_pixel(40, 40, Rgb([255, 0, 0]));
    let mut tile = RgbImage::from_pixel(16, 16, Rgb([1, 2, 3]));
    let params = InverseParams {
        panorama_width: 400,
        panorama_height: 200,
        window_x: 300,
        window_y: 80,
        sensor_x: 100.,
        sensor_y: 100.,
    };
    let written = project_inverse(
        &mut ImageViewMut::from_image(&mut tile).unwrap(),
        &ImageView::from_image(&window).unwrap(),
        &params,
        &Interpolation::Nearest,
    )
    .unwrap();
    assert_eq!(written, 0);
    assert!(tile.pixels().all(|p| p.0 == [1, 2, 3]));
}
