// src/processing/formula.rs
use rayon::prelude::*;

use crate::config::AlbedoMethod;
use crate::error::{AlbedoError, Result};
use crate::io::BandArray;

/// Path radiance equivalent albedo subtracted by the Beg formula (`A_pd`).
pub const PATH_RADIANCE_ALBEDO: f32 = 0.03;

/// Constant removed from the Liang weighted sum.
pub const LIANG_OFFSET: f32 = 0.0018;

/// Step applied to the weighted band sum before clipping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PostStep {
    None,
    /// Subtract a constant from every pixel.
    Subtract(f32),
    /// Treat the sum as TOA albedo and correct it with elevation-dependent
    /// shortwave transmissivity.
    ElevationCorrection { path_radiance: f32 },
}

/// Band weights for bands 2 to 7, in that order, and the post step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Formula {
    pub method: AlbedoMethod,
    pub coefficients: [f32; 6],
    pub post_step: PostStep,
}

// Tasumi et al. 2008, Olmedo (R `water` package) and Liang 2000 work on
// surface reflectance; Beg et al. 2016 on TOA reflectance.
pub const FORMULAS: [Formula; 4] = [
    Formula {
        method: AlbedoMethod::Tasumi,
        coefficients: [0.254, 0.149, 0.147, 0.311, 0.103, 0.036],
        post_step: PostStep::None,
    },
    Formula {
        method: AlbedoMethod::Olmedo,
        coefficients: [0.246, 0.146, 0.191, 0.304, 0.105, 0.008],
        post_step: PostStep::None,
    },
    Formula {
        method: AlbedoMethod::Liang,
        coefficients: [0.356, 0.0, 0.130, 0.373, 0.085, 0.072],
        post_step: PostStep::Subtract(LIANG_OFFSET),
    },
    Formula {
        method: AlbedoMethod::Beg,
        coefficients: [0.356, 0.326, 0.138, 0.084, 0.056, 0.041],
        post_step: PostStep::ElevationCorrection {
            path_radiance: PATH_RADIANCE_ALBEDO,
        },
    },
];

impl Formula {
    pub fn lookup(method: AlbedoMethod) -> Result<&'static Formula> {
        FORMULAS
            .iter()
            .find(|formula| formula.method == method)
            .ok_or_else(|| {
                AlbedoError::Configuration(format!("no coefficients for albedo method `{method}`"))
            })
    }
}

/// Weighted sum of six band grids, matched to `coefficients` by position.
pub fn linear_combination(bands: &[BandArray], coefficients: &[f32; 6]) -> Result<BandArray> {
    if bands.len() != coefficients.len() {
        return Err(AlbedoError::Configuration(format!(
            "expected {} bands, got {}",
            coefficients.len(),
            bands.len()
        )));
    }

    let shape = bands[0].shape();
    for (i, band) in bands.iter().enumerate().skip(1) {
        check_shape(&format!("band array {}", i), shape, band.shape())?;
    }

    let band_data: Vec<&[f32]> = bands.iter().map(|band| band.data()).collect();
    let mut result_data = vec![0.0f32; shape.0 * shape.1];

    result_data.par_iter_mut().enumerate().for_each(|(i, result)| {
        *result = coefficients
            .iter()
            .zip(&band_data)
            .map(|(coefficient, band)| coefficient * band[i])
            .sum();
    });

    Ok(BandArray::new(shape, result_data))
}

pub fn subtract_offset(array: &mut BandArray, offset: f32) {
    array.data_mut().par_iter_mut().for_each(|value| *value -= offset);
}

/// Shortwave atmospheric transmissivity at `elevation` metres.
pub fn transmissivity(elevation: f32) -> f32 {
    0.75 + 0.00002 * elevation
}

/// Converts TOA albedo to surface albedo: `(A_toa - A_pd) / t_sw^2`.
pub fn correct_for_elevation(
    toa_albedo: &mut BandArray,
    elevation: &BandArray,
    path_radiance: f32,
) -> Result<()> {
    check_shape("resampled elevation", toa_albedo.shape(), elevation.shape())?;

    toa_albedo
        .data_mut()
        .par_iter_mut()
        .zip(elevation.data().par_iter())
        .for_each(|(albedo, &height)| {
            let t_sw = transmissivity(height);
            *albedo = (*albedo - path_radiance) / (t_sw * t_sw);
        });

    Ok(())
}

/// Clamps every value into `[0, 1]`. NaN passes through untouched.
pub fn clip_to_unit(array: &mut BandArray) {
    array.data_mut().par_iter_mut().for_each(|value| {
        if *value < 0.0 {
            *value = 0.0;
        } else if *value > 1.0 {
            *value = 1.0;
        }
    });
}

fn check_shape(what: &str, expected: (usize, usize), actual: (usize, usize)) -> Result<()> {
    if expected != actual {
        return Err(AlbedoError::ShapeMismatch {
            what: what.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_method_has_six_coefficients() {
        for method in AlbedoMethod::ALL {
            let formula = Formula::lookup(method).unwrap();
            assert_eq!(formula.method, method);
            assert_eq!(formula.coefficients.len(), 6);
        }
    }

    #[test]
    fn post_steps_per_method() {
        assert_eq!(Formula::lookup(AlbedoMethod::Tasumi).unwrap().post_step, PostStep::None);
        assert_eq!(Formula::lookup(AlbedoMethod::Olmedo).unwrap().post_step, PostStep::None);
        assert_eq!(
            Formula::lookup(AlbedoMethod::Liang).unwrap().post_step,
            PostStep::Subtract(0.0018)
        );
        assert_eq!(
            Formula::lookup(AlbedoMethod::Beg).unwrap().post_step,
            PostStep::ElevationCorrection { path_radiance: 0.03 }
        );
    }

    #[test]
    fn transmissivity_grows_with_elevation() {
        assert_eq!(transmissivity(0.0), 0.75);
        assert!((transmissivity(1000.0) - 0.77).abs() < 1e-6);
    }

    #[test]
    fn clip_keeps_in_range_values_and_nan() {
        let mut array = BandArray::new((5, 1), vec![-0.2, 0.0, 0.42, 1.0, 1.7]);
        clip_to_unit(&mut array);
        assert_eq!(array.data(), &[0.0, 0.0, 0.42, 1.0, 1.0]);

        let mut array = BandArray::new((1, 1), vec![f32::NAN]);
        clip_to_unit(&mut array);
        assert!(array.data()[0].is_nan());
    }

    #[test]
    fn mismatched_band_shapes_are_rejected() {
        let mut bands: Vec<BandArray> = (0..5)
            .map(|_| BandArray::new((2, 2), vec![0.1; 4]))
            .collect();
        bands.push(BandArray::new((4, 1), vec![0.1; 4]));

        let err = linear_combination(&bands, &FORMULAS[0].coefficients).err().unwrap();
        assert!(matches!(err, AlbedoError::ShapeMismatch { .. }));
    }
}
