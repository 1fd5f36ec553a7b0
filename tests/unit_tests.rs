// tests/unit_tests.rs
mod common;

use landsat_albedo::io::BandArray;
use landsat_albedo::processing::formula::{
    clip_to_unit, correct_for_elevation, linear_combination, subtract_offset, Formula,
    LIANG_OFFSET, PATH_RADIANCE_ALBEDO,
};
use landsat_albedo::AlbedoMethod;

use common::band_array;

/// Six 2x2 bands with distinct reflectance per band and pixel
fn create_test_bands() -> Vec<BandArray> {
    let per_band: [[f32; 4]; 6] = [
        [0.08, 0.12, 0.30, 0.02],
        [0.07, 0.10, 0.28, 0.03],
        [0.05, 0.09, 0.25, 0.04],
        [0.35, 0.22, 0.40, 0.01],
        [0.20, 0.18, 0.33, 0.00],
        [0.12, 0.11, 0.29, 0.00],
    ];

    per_band
        .iter()
        .map(|values| band_array(2, 2, values))
        .collect()
}

/// Test the Olmedo weighted sum against the closed form
#[test]
fn test_olmedo_linear_combination() {
    let bands = create_test_bands();
    let formula = Formula::lookup(AlbedoMethod::Olmedo).unwrap();

    let result = linear_combination(&bands, &formula.coefficients).unwrap();
    assert_eq!(result.shape(), (2, 2));

    for i in 0..4 {
        let b: Vec<f32> = bands.iter().map(|band| band.data()[i]).collect();
        let expected = 0.246 * b[0]
            + 0.146 * b[1]
            + 0.191 * b[2]
            + 0.304 * b[3]
            + 0.105 * b[4]
            + 0.008 * b[5];
        assert!(
            (result.data()[i] - expected).abs() < 1e-6,
            "Expected {}, got {} at index {}",
            expected,
            result.data()[i],
            i
        );
    }
}

/// Test that Tasumi weights are matched to bands by position
#[test]
fn test_tasumi_single_band_weights() {
    let formula = Formula::lookup(AlbedoMethod::Tasumi).unwrap();
    let expected = [0.254, 0.149, 0.147, 0.311, 0.103, 0.036];

    for (position, weight) in expected.iter().enumerate() {
        let bands: Vec<BandArray> = (0..6)
            .map(|i| band_array(1, 1, &[if i == position { 1.0 } else { 0.0 }]))
            .collect();

        let result = linear_combination(&bands, &formula.coefficients).unwrap();
        assert!((result.data()[0] - weight).abs() < 1e-7);
    }
}

/// Liang with a weighted sum of exactly 0.5 gives 0.4982
#[test]
fn test_liang_offset() {
    let formula = Formula::lookup(AlbedoMethod::Liang).unwrap();
    let weight_sum: f32 = formula.coefficients.iter().sum();
    let bands: Vec<BandArray> = (0..6)
        .map(|_| band_array(1, 1, &[0.5 / weight_sum]))
        .collect();

    let mut result = linear_combination(&bands, &formula.coefficients).unwrap();
    assert!((result.data()[0] - 0.5).abs() < 1e-6);

    subtract_offset(&mut result, LIANG_OFFSET);
    assert!((result.data()[0] - 0.4982).abs() < 1e-6);

    clip_to_unit(&mut result);
    assert!((result.data()[0] - 0.4982).abs() < 1e-6);
}

/// Beg correction at sea level uses t_sw = 0.75
#[test]
fn test_beg_elevation_correction() {
    let test_cases = [
        // A_toa, elevation, expected
        (0.5, 0.0, 0.835_556),    // (0.5 - 0.03) / 0.75^2
        (0.5, 1000.0, 0.792_714), // (0.5 - 0.03) / 0.77^2
        (0.03, 250.0, 0.0),       // path radiance only
    ];

    let toa: Vec<f32> = test_cases.iter().map(|(a, _, _)| *a).collect();
    let elevation: Vec<f32> = test_cases.iter().map(|(_, e, _)| *e).collect();

    let mut albedo = band_array(3, 1, &toa);
    let elevation = band_array(3, 1, &elevation);
    correct_for_elevation(&mut albedo, &elevation, PATH_RADIANCE_ALBEDO).unwrap();

    for (i, (_, _, expected)) in test_cases.iter().enumerate() {
        assert!(
            (albedo.data()[i] - expected).abs() < 1e-4,
            "Expected {}, got {} at index {}",
            expected,
            albedo.data()[i],
            i
        );
    }
}

/// Elevation grid must match the albedo grid
#[test]
fn test_beg_elevation_shape_mismatch() {
    let mut albedo = band_array(2, 2, &[0.5]);
    let elevation = band_array(4, 1, &[0.0]);
    assert!(correct_for_elevation(&mut albedo, &elevation, PATH_RADIANCE_ALBEDO).is_err());
}

/// Clipping twice equals clipping once
#[test]
fn test_clip_idempotence() {
    let values = [-3.0, -0.0001, 0.0, 0.25, 0.9999, 1.0, 1.0001, 42.0];
    let mut once = band_array(4, 2, &values);
    clip_to_unit(&mut once);

    let mut twice = band_array(4, 2, once.data());
    clip_to_unit(&mut twice);

    assert_eq!(once.data(), twice.data());
    assert_eq!(once.data(), &[0.0, 0.0, 0.0, 0.25, 0.9999, 1.0, 1.0, 1.0]);
}

/// A wrong number of bands is refused
#[test]
fn test_band_count_checked() {
    let bands: Vec<BandArray> = (0..5).map(|_| band_array(1, 1, &[0.1])).collect();
    let formula = Formula::lookup(AlbedoMethod::Olmedo).unwrap();
    assert!(linear_combination(&bands, &formula.coefficients).is_err());
}
