//! This crate implements the Value of Interest (VOI) transformation
//! of DICOM grayscale images,
//! which maps modality values
//! (sample values after the modality rescale)
//! into 8-bit display intensities.
//!
//! Two kinds of transformations are supported:
//!
//! - a [linear](LinearVoi) window level transformation,
//!   defined by the _Window Width_ and _Window Center_;
//! - a [non-linear](NonLinearVoi) transformation
//!   through a [device LUT](DeviceLut),
//!   with the window level applied on the table's shifted output.
//!
//! The function [`voi_transform`] picks the right one
//! depending on whether a device LUT is available.
//! Outputs are not clamped to the display range,
//! this is left to the renderer.
//!
//! # Examples
//!
//! ```
//! use dicom_voi::{voi_transform, DeviceLut, WindowLevel};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let window_level = WindowLevel::new(400., 40.);
//!
//! // linear windowing
//! let voi = voi_transform(window_level, None);
//! assert_eq!(voi.apply(40.), 127.5);
//!
//! // windowing over a 12-bit device LUT
//! let lut = DeviceLut::new(-1024, vec![0, 1024, 2048, 4095])?;
//! let voi = voi_transform(window_level, Some(&lut));
//! assert_eq!(voi.apply(-2048.), 0.);
//! assert_eq!(voi.apply(2048.), 255.);
//! # Ok(())
//! # }
//! ```

use num_traits::ToPrimitive;
#[cfg(feature = "rayon")]
use rayon::iter::ParallelIterator;

pub mod lut;
pub mod window;

pub use lut::{CreateDeviceLutError, DeviceLut, NonLinearVoi};
pub use window::{LinearVoi, WindowLevel};

/// Create the VOI transformation for the given window level
/// and optional device LUT.
///
/// If a device LUT is given,
/// the transformation is [non-linear](NonLinearVoi),
/// and the window level is applied on the table's output.
/// Otherwise, the transformation is a [linear](LinearVoi) window level.
pub fn voi_transform(window_level: WindowLevel, lut: Option<&DeviceLut>) -> VoiTransform<'_> {
    match lut {
        Some(lut) => VoiTransform::NonLinear(NonLinearVoi::new(window_level, lut)),
        None => VoiTransform::Linear(LinearVoi::new(window_level)),
    }
}

/// A VOI transformation from modality values to display values.
///
/// The transformation holds no mutable state,
/// so it can be freely copied and shared across threads.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum VoiTransform<'a> {
    /// window level only
    Linear(LinearVoi),
    /// device LUT followed by a window level
    NonLinear(NonLinearVoi<'a>),
}

impl VoiTransform<'_> {
    /// The window level of this transformation.
    pub fn window_level(&self) -> WindowLevel {
        match self {
            VoiTransform::Linear(voi) => voi.window_level(),
            VoiTransform::NonLinear(voi) => voi.window_level(),
        }
    }

    /// Apply the transformation to a single modality value.
    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            VoiTransform::Linear(voi) => voi.apply(value),
            VoiTransform::NonLinear(voi) => voi.apply(value),
        }
    }

    /// Apply the transformation to a modality value of any primitive type.
    ///
    /// Values which cannot be represented as `f64` are treated as NaN.
    #[inline]
    pub fn get<V>(&self, value: V) -> f64
    where
        V: ToPrimitive,
    {
        self.apply(value.to_f64().unwrap_or(f64::NAN))
    }

    /// Adapts an iterator of modality values
    /// to an iterator of transformed values.
    pub fn map_iter<'s, I>(
        &'s self,
        iter: impl IntoIterator<Item = I> + 's,
    ) -> impl Iterator<Item = f64> + 's
    where
        I: ToPrimitive + 's,
    {
        iter.into_iter().map(move |v| self.get(v))
    }

    /// Adapts a parallel iterator of modality values
    /// to a parallel iterator of transformed values.
    #[cfg(feature = "rayon")]
    pub fn map_par_iter<'s, I>(
        &'s self,
        iter: impl ParallelIterator<Item = I> + 's,
    ) -> impl ParallelIterator<Item = f64> + 's
    where
        I: ToPrimitive + Send + 's,
    {
        iter.map(move |v| self.get(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn transform_is_send_sync() {
        assert_send_sync::<VoiTransform<'static>>();
        assert_send_sync::<DeviceLut>();
    }

    #[test]
    fn selects_linear_without_lut() {
        let window_level = WindowLevel::new(400., 40.);
        let voi = voi_transform(window_level, None);

        assert!(matches!(voi, VoiTransform::Linear(_)));
        assert_eq!(voi.window_level(), window_level);
        assert_eq!(voi.apply(40.), 127.5);
    }

    #[test]
    fn selects_non_linear_with_lut() {
        let lut = DeviceLut::new(100, vec![0, 4095]).unwrap();
        let window_level = WindowLevel::new(4095., 2048.);
        let voi = voi_transform(window_level, Some(&lut));

        let VoiTransform::NonLinear(non_linear) = voi else {
            panic!("expected a non-linear transform, got {:?}", voi);
        };
        assert_eq!(non_linear.shift(), 4);
        assert_eq!(voi.window_level(), window_level);
        assert_eq!(voi.apply(50.), 0.);
        assert_eq!(voi.apply(200.), 255.);
    }

    /// Transforms created with the same arguments
    /// give the same outputs.
    #[rstest(value => [-2048., -1., 0., 0.5, 99., 100., 101., 102., 1e6])]
    fn selector_is_referentially_transparent(value: f64) {
        let lut = DeviceLut::new(100, vec![0, 2000, 4095]).unwrap();
        let window_level = WindowLevel::new(4095., 2048.);

        let a = voi_transform(window_level, Some(&lut));
        let b = voi_transform(window_level, Some(&lut));
        assert_eq!(a, b);
        assert_eq!(a.apply(value).to_bits(), b.apply(value).to_bits());

        let a = voi_transform(window_level, None);
        let b = voi_transform(window_level, None);
        assert_eq!(a.apply(value).to_bits(), b.apply(value).to_bits());
    }

    #[test]
    fn get_accepts_sample_types() {
        let voi = voi_transform(WindowLevel::new(256., 128.), None);

        assert_eq!(voi.get(128_u8), voi.apply(128.));
        assert_eq!(voi.get(-5_i16), voi.apply(-5.));
        assert_eq!(voi.get(4000_u32), voi.apply(4000.));
        assert_eq!(voi.get(12.5_f32), voi.apply(12.5));
    }

    #[test]
    fn map_iter_transforms_each_value() {
        let lut = DeviceLut::new(0, vec![0, 64, 128, 255]).unwrap();
        let voi = voi_transform(WindowLevel::new(256., 128.), Some(&lut));

        let samples: Vec<i16> = vec![-1, 0, 1, 2, 3, 4];
        let out: Vec<f64> = voi.map_iter(samples.iter().copied()).collect();
        let expected: Vec<f64> = samples.iter().map(|&v| voi.apply(v as f64)).collect();
        assert_eq!(out, expected);
        assert_eq!(out[0], 0.);
        assert_eq!(out[5], 255.);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn map_par_iter_matches_map_iter() {
        use rayon::iter::IntoParallelIterator;

        let data: Vec<u16> = (0..4096_u16).map(|v| v / 2).collect();
        let lut = DeviceLut::new(-1024, data).unwrap();
        let voi = voi_transform(WindowLevel::new(1500., 700.), Some(&lut));

        let sequential: Vec<f64> = voi.map_iter(-1100..3100).collect();
        let parallel: Vec<f64> = voi.map_par_iter((-1100..3100).into_par_iter()).collect();
        assert_eq!(sequential, parallel);
    }
}
