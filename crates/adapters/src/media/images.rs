use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use folio_application::{ApplicationError, ImageDerivatives};
use folio_domain::{
    cover_plan, derivative_file_name, fit_inside, DerivativeSpec, Fit, IMAGE_DERIVATIVES,
    IMAGE_EXTENSION, IMAGE_QUALITY,
};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::io::Reader as ImageReader;
use image::{ColorType, DynamicImage};
use tracing::debug;

pub(crate) fn generate_image_derivatives(
    source: &Path,
    output_dir: &Path,
    base_name: &str,
) -> Result<ImageDerivatives, ApplicationError> {
    let reader = ImageReader::open(source)
        .map_err(|error| ApplicationError::Io(error.to_string()))?
        .with_guessed_format()
        .map_err(|error| ApplicationError::Decode(error.to_string()))?;
    let format = reader
        .format()
        .map(|format| format!("{format:?}").to_ascii_lowercase())
        .unwrap_or_else(|| "unknown".to_string());
    let image = reader
        .decode()
        .map_err(|error| ApplicationError::Decode(error.to_string()))?;

    fs::create_dir_all(output_dir).map_err(|error| ApplicationError::Io(error.to_string()))?;

    let mut produced = Vec::with_capacity(IMAGE_DERIVATIVES.len());
    for spec in IMAGE_DERIVATIVES {
        let resized = resize_for(&image, spec);
        let name = derivative_file_name(base_name, spec.name, IMAGE_EXTENSION);
        save_jpeg(&resized, &output_dir.join(&name))?;
        debug!(
            derivative = %name,
            width = resized.width(),
            height = resized.height(),
            "wrote image derivative"
        );
        produced.push(name);
    }

    Ok(ImageDerivatives {
        produced,
        width: image.width(),
        height: image.height(),
        format,
    })
}

pub(crate) fn resize_for(image: &DynamicImage, spec: DerivativeSpec) -> DynamicImage {
    match spec.fit {
        Fit::Inside => {
            let (width, height) = fit_inside(image.width(), image.height(), spec.width, spec.height);
            if (width, height) == (image.width(), image.height()) {
                return image.clone();
            }
            image.resize_exact(width, height, FilterType::Lanczos3)
        }
        Fit::Cover => {
            let plan = cover_plan(image.width(), image.height(), spec.width, spec.height);
            image
                .crop_imm(plan.crop_x, plan.crop_y, plan.crop_width, plan.crop_height)
                .resize_exact(plan.out_width, plan.out_height, FilterType::Lanczos3)
        }
    }
}

fn save_jpeg(image: &DynamicImage, path: &Path) -> Result<(), ApplicationError> {
    let file = File::create(path).map_err(|error| ApplicationError::Io(error.to_string()))?;
    let rgb = image.to_rgb8();
    JpegEncoder::new_with_quality(BufWriter::new(file), IMAGE_QUALITY)
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        .map_err(|error| ApplicationError::Io(error.to_string()))
}
