/// Intensity extraction: collapse a 2-D image region into a 1-D profile.
use image::DynamicImage;

use crate::config::RegionSelection;
use crate::data::profile::IntensityProfile;
use crate::error::{Result, SpectrumError};

/// Convert the selected image region into one intensity sample per column.
///
/// Channel values are averaged without luminance weighting; a band region
/// additionally averages across its rows. Pure function of its inputs.
pub fn extract_profile(image: &DynamicImage, region: RegionSelection) -> Result<IntensityProfile> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    let (top, bottom) = match region {
        RegionSelection::Row(y) => {
            if y >= height {
                return Err(SpectrumError::InvalidRegion(format!(
                    "row {} in {}x{} image",
                    y, width, height
                )));
            }
            (y, y + 1)
        }
        RegionSelection::Band { top, bottom } => {
            if top >= bottom || bottom > height {
                return Err(SpectrumError::InvalidRegion(format!(
                    "band rows {}..{} in {}x{} image",
                    top, bottom, width, height
                )));
            }
            (top, bottom)
        }
    };

    let rows = (bottom - top) as f64;
    let samples = (0..width)
        .map(|x| {
            let mut sum = 0.0;
            for y in top..bottom {
                let px = rgb.get_pixel(x, y);
                sum += (px.0[0] as f64 + px.0[1] as f64 + px.0[2] as f64) / 3.0;
            }
            sum / rows
        })
        .collect();

    Ok(IntensityProfile::new(samples))
}
