//! End-to-end tests through the host entry points, on the CPU backend.

use approx::assert_relative_eq;
use livefx_compute::Executor;
use livefx_compute::kernels::gaussian_weights;
use livefx_core::geometry::{align_for_dispatch, pad, unalign, unpad};
use livefx_core::PixelBuffer;
use livefx_effects::{ErrorKind, apply, edit, interpolate, list, scale};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

fn noise_image(width: u32, height: u32, seed: u64) -> PixelBuffer {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..width * height * 4).map(|_| rng.gen_range(0..=u8::MAX)).collect();
    PixelBuffer::new(width, height, data).unwrap()
}

#[test]
fn test_registry_lists_all_effects() {
    let effects = list();
    assert_eq!(effects.len(), 4);
    assert!(effects.iter().all(|e| e.version.major == 1));
}

#[test]
fn test_buffer_size_mismatch() {
    let err = apply(&Executor::cpu(), "directional-blur-v1", &json!({}), 10, 10, vec![0; 399]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BufferSizeMismatch);
}

#[test]
fn test_interpolate_endpoints() {
    let a = json!({ "strength": 4, "angle": 10, "blurMode": "front", "fadeOut": 0.25 });
    let b = json!({ "strength": 20, "angle": 350.5, "blurMode": "behind", "opacity": 30 });
    let id = "directional-blur-v1";

    assert_eq!(interpolate(id, &a, &a, 0.37).unwrap(), edit(id, &a).unwrap());
    assert_eq!(interpolate(id, &a, &b, 0.0).unwrap().real("strength").unwrap(), 4.0);
    let at_b = interpolate(id, &a, &b, 1.0).unwrap();
    assert_eq!(at_b, edit(id, &b).unwrap());

    let mid = interpolate(id, &a, &b, 0.5).unwrap();
    assert_relative_eq!(mid.real("strength").unwrap(), 12.0);
    assert_relative_eq!(mid.real("opacity").unwrap(), 65.0);
    assert_eq!(mid.string("blurMode").unwrap(), "behind");
}

#[test]
fn test_interpolate_rounds_ints() {
    let a = json!({ "padding": 0 });
    let b = json!({ "padding": 3 });
    let mid = interpolate("chromatic-aberration-v1", &a, &b, 0.5).unwrap();
    assert_eq!(mid.int("padding").unwrap(), 2);
}

#[test]
fn test_scale_leaves_angles() {
    let p = scale("chromatic-aberration-v1", &json!({ "strength": 4, "angle": 90, "padding": 2 }), 2.0).unwrap();
    assert_eq!(p.real("strength").unwrap(), 8.0);
    assert_eq!(p.real("angle").unwrap(), 90.0);
    assert_eq!(p.int("padding").unwrap(), 4);
    assert_eq!(p.string("colorMode").unwrap(), "rgb");
}

#[test]
fn test_pad_unpad_identity() {
    let img = noise_image(7, 3, 1);
    for margin in [0, 1, 5, 16] {
        let padded = pad(&img, margin).unwrap();
        assert_eq!(unpad(&padded, 7, 3).unwrap(), img);
    }
}

#[test]
fn test_align_round_trip() {
    for size in [255, 256] {
        let img = noise_image(size, size, size as u64);
        let (aligned, plan) = align_for_dispatch(&img, 64).unwrap();
        assert_eq!(aligned.width() % 64, 0);
        assert_eq!(aligned.height() % 64, 0);
        assert_eq!(unalign(&aligned, &plan).unwrap(), img);
    }
}

#[test]
fn test_gaussian_weights_sum_to_one() {
    for radius in [0.0f32, 0.5, 1.0, 3.0, 7.5, 20.0] {
        let sum: f32 = gaussian_weights(radius).iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
    }
}

#[test]
fn test_directional_noop_is_byte_identical() {
    let img = noise_image(13, 9, 2);
    let engine = Executor::cpu();
    for state in [json!({ "strength": 0 }), json!({ "opacity": 0, "strength": 30 })] {
        let out = apply(&engine, "directional-blur-v1", &state, 13, 9, img.data().to_vec()).unwrap();
        assert_eq!(out, img);
    }
}

#[test]
fn test_chromatic_zero_strength_is_original() {
    let img = noise_image(6, 6, 3);
    let out = apply(&Executor::cpu(), "chromatic-aberration-v1", &json!({ "strength": 0 }), 6, 6, img.data().to_vec())
        .unwrap();
    assert_eq!(out, img);
}

#[test]
fn test_random_noise_on_white() {
    let out = apply(&Executor::cpu(), "randomNoise-v1", &json!({}), 4, 4, vec![255; 64]).unwrap();
    assert_eq!((out.width(), out.height()), (4, 4));
    assert!(out.data().chunks_exact(4).all(|p| p[3] == 255));
}

#[test]
fn test_directional_blur_spreads_and_grows() {
    let mut img = PixelBuffer::transparent(21, 5);
    for y in 0..5 {
        let i = ((y * 21 + 10) * 4) as usize;
        img.data_mut()[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
    }
    let out = apply(
        &Executor::cpu(),
        "directional-blur-v1",
        &json!({ "strength": 4 }),
        21,
        5,
        img.data().to_vec(),
    )
    .unwrap();
    assert_eq!((out.width(), out.height()), (29, 13));
    // the column sits at x = 14 after padding; horizontal neighbors pick it up
    let row = 6;
    assert!(out.pixel(13, row)[3] > 0);
    assert!(out.pixel(15, row)[3] > 0);
    assert!(out.pixel(14, row)[3] < 255);
}

#[test]
fn test_gaussian_huge_radius_is_limit_error() {
    let err = apply(&Executor::cpu(), "blur-v1", &json!({ "radius": 3.0e9 }), 1, 1, vec![255; 4]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceLimitExceeded);
}

#[test]
fn test_chromatic_padding_limit_ignores_strength() {
    let engine = Executor::cpu();
    for strength in [0, 1] {
        let state = json!({ "strength": strength, "padding": 8200 });
        let err = apply(&engine, "chromatic-aberration-v1", &state, 1, 1, vec![255; 4]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceLimitExceeded);
    }
}
