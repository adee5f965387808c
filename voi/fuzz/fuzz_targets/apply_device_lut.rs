#![no_main]
use byteorder::{LittleEndian as LE, ReadBytesExt};
use dicom_voi::{DeviceLut, WindowLevel, voi_transform};
use libfuzzer_sys::fuzz_target;
use std::error::Error;

fuzz_target!(|data: &[u8]| {
    let _ = fuzz(data);
});

/// Read a window level, a device LUT, and a list of modality values
/// from raw bytes in a non-standard format,
/// then apply the transformation to every value.
///
/// Malformed tables must never cause a panic.
fn fuzz(data: &[u8]) -> Result<(), Box<dyn Error>> {
    let reader = &mut (&data[..]);

    let width = reader.read_f64::<LE>()?;
    let center = reader.read_f64::<LE>()?;
    let first_value_mapped = reader.read_i32::<LE>()?;
    let lut_len = reader.read_u16::<LE>()? as usize;

    let mut lut = Vec::with_capacity(lut_len);
    for _ in 0..lut_len {
        lut.push(reader.read_u16::<LE>()?);
    }
    let lut = DeviceLut::new(first_value_mapped, lut).ok();

    let voi = voi_transform(WindowLevel::new(width, center), lut.as_ref());
    while let Ok(value) = reader.read_f64::<LE>() {
        let _ = voi.apply(value);
    }

    Ok(())
}
