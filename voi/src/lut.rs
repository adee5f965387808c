//! Device look-up table (LUT) and the non-linear VOI transformation.
//!
//! This module contains the [`DeviceLut`] data type,
//! holding a manufacturer-provided VOI LUT
//! as found in the _VOI LUT Sequence_ of an image,
//! and [`NonLinearVoi`],
//! which maps modality values through the device LUT
//! before applying a window level on the table's output.

use snafu::Snafu;

use crate::window::{LinearVoi, WindowLevel};

/// The device LUT could not be created: the table has no entries
#[derive(Debug, Copy, Clone, PartialEq, Snafu)]
pub struct CreateDeviceLutError {
    _private: (),
}

/// A VOI look up table supplied by the device.
///
/// The entry at index `i` is the output
/// for the modality value `first_value_mapped + i`.
/// The table is expected to be monotonically non-decreasing,
/// but this is not enforced:
/// malformed tables are still used for transforming values.
///
/// # Example
///
/// ```
/// # use dicom_voi::{CreateDeviceLutError, DeviceLut};
/// let lut = DeviceLut::new(-1024, vec![0, 1024, 2048, 4095])?;
///
/// assert_eq!(lut.bits_per_entry(), 12);
/// assert_eq!(lut.max_value_mapped(), -1021);
/// # Result::<(), CreateDeviceLutError>::Ok(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceLut {
    /// the modality value which maps to the first entry
    first_value_mapped: i32,
    /// the table entries, never empty
    data: Vec<u16>,
}

impl DeviceLut {
    /// Create a new device LUT.
    ///
    /// - `first_value_mapped`:
    ///   the modality value mapped to the first entry
    ///   (second value of the _LUT Descriptor_)
    /// - `data`: the table entries (the _LUT Data_)
    ///
    /// Returns an error if `data` is empty.
    pub fn new(
        first_value_mapped: i32,
        data: impl Into<Vec<u16>>,
    ) -> Result<Self, CreateDeviceLutError> {
        let data = data.into();
        if data.is_empty() {
            return Err(CreateDeviceLutError { _private: () });
        }
        let lut = DeviceLut {
            first_value_mapped,
            data,
        };
        if !lut.is_monotonic() {
            tracing::debug!(
                "Device LUT starting at {} is not monotonically non-decreasing",
                first_value_mapped
            );
        }
        Ok(lut)
    }

    /// The modality value mapped to the first entry of the table.
    #[inline]
    pub fn first_value_mapped(&self) -> i32 {
        self.first_value_mapped
    }

    /// The table entries.
    #[inline]
    pub fn data(&self) -> &[u16] {
        &self.data
    }

    /// The modality value mapped to the last entry of the table.
    ///
    /// Values at or above this one are clamped
    /// to the last entry by the non-linear transformation.
    #[inline]
    pub fn max_value_mapped(&self) -> i64 {
        i64::from(self.first_value_mapped) + self.data.len() as i64 - 1
    }

    /// The number of bits needed to represent the largest entry in the table.
    ///
    /// This is inferred from the table's contents,
    /// since the bit depth declared in the _LUT Descriptor_
    /// is known to be wrong in some devices.
    /// A table of zeros is considered to have 1 bit per entry.
    pub fn bits_per_entry(&self) -> u32 {
        let max = self.data.iter().copied().max().unwrap_or(0);
        (u16::BITS - max.leading_zeros()).max(1)
    }

    /// Whether the table entries never decrease.
    pub fn is_monotonic(&self) -> bool {
        self.data.windows(2).all(|w| w[0] <= w[1])
    }

    #[inline]
    fn first(&self) -> u16 {
        self.data[0]
    }

    #[inline]
    fn last(&self) -> u16 {
        self.data[self.data.len() - 1]
    }
}

/// A non-linear VOI transformation defined by a device LUT
/// and a window level.
///
/// Modality values are mapped through the table,
/// and its entries are shifted right so that they fit in 8 bits.
/// The window level, shifted by the same amount,
/// is then applied linearly to the shifted entry.
/// Modality values before the start of the table
/// yield the first shifted entry,
/// and modality values at or after [`max_value_mapped`]
/// yield the last shifted entry.
///
/// [`max_value_mapped`]: DeviceLut::max_value_mapped
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NonLinearVoi<'a> {
    lut: &'a DeviceLut,
    window_level: WindowLevel,
    /// linear transformation over shifted table entries
    window: LinearVoi,
    bits_per_entry: u32,
    shift: i32,
    min_value: i32,
    max_value: i32,
    max_value_mapped: i64,
}

impl<'a> NonLinearVoi<'a> {
    /// Create a non-linear VOI transformation
    /// from the given window level and device LUT.
    pub fn new(window_level: WindowLevel, lut: &'a DeviceLut) -> Self {
        let bits_per_entry = lut.bits_per_entry();
        let shift = bits_per_entry as i32 - 8;

        tracing::debug!(
            "Device LUT has {} bits per entry, shifting entries by {}",
            bits_per_entry,
            shift
        );
        if shift < 0 {
            tracing::warn!(
                "Device LUT has only {} bits per entry, transformed values will degenerate",
                bits_per_entry
            );
        }

        let window = LinearVoi::new(WindowLevel {
            width: shift_right(to_int32(window_level.width), shift) as f64,
            center: shift_right(to_int32(window_level.center), shift) as f64,
        });

        NonLinearVoi {
            lut,
            window_level,
            window,
            bits_per_entry,
            shift,
            min_value: shift_right(i32::from(lut.first()), shift),
            max_value: shift_right(i32::from(lut.last()), shift),
            max_value_mapped: lut.max_value_mapped(),
        }
    }

    /// The device LUT of this transformation.
    #[inline]
    pub fn lut(&self) -> &'a DeviceLut {
        self.lut
    }

    /// The window level of this transformation,
    /// as given before shifting.
    #[inline]
    pub fn window_level(&self) -> WindowLevel {
        self.window_level
    }

    /// The number of bits per table entry inferred from the device LUT.
    #[inline]
    pub fn bits_per_entry(&self) -> u32 {
        self.bits_per_entry
    }

    /// The right shift applied to table entries and to the window level.
    #[inline]
    pub fn shift(&self) -> i32 {
        self.shift
    }

    /// The output for modality values before the start of the table.
    #[inline]
    pub fn min_value(&self) -> i32 {
        self.min_value
    }

    /// The output for modality values at or after the end of the table.
    #[inline]
    pub fn max_value(&self) -> i32 {
        self.max_value
    }

    /// The first modality value which yields [`max_value`](Self::max_value).
    #[inline]
    pub fn max_value_mapped(&self) -> i64 {
        self.max_value_mapped
    }

    /// Apply the transformation to a modality value.
    pub fn apply(&self, value: f64) -> f64 {
        let first_value_mapped = self.lut.first_value_mapped;
        if value < f64::from(first_value_mapped) {
            return f64::from(self.min_value);
        }
        if value >= self.max_value_mapped as f64 {
            return f64::from(self.max_value);
        }
        // within [first_value_mapped, max_value_mapped), or NaN;
        // only whole offsets name a table entry, anything else reads as 0
        let offset = value - f64::from(first_value_mapped);
        let entry = if offset.fract() == 0. {
            self.lut.data.get(offset as usize).copied().unwrap_or(0)
        } else {
            0
        };
        self.window
            .apply(f64::from(shift_right(i32::from(entry), self.shift)))
    }
}

/// Arithmetic right shift with the amount taken modulo 32.
#[inline]
fn shift_right(value: i32, shift: i32) -> i32 {
    value.wrapping_shr(shift as u32)
}

/// Truncate a number to a 32-bit integer,
/// wrapping around on overflow.
/// Non-finite numbers become 0.
fn to_int32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().rem_euclid(4_294_967_296.) as u32 as i32
}
