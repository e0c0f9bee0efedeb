#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Scale down to fit the box, keeping aspect ratio, no cropping.
    Inside,
    /// Scale and crop so the output fills the box.
    Cover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivativeSpec {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub fit: Fit,
}

pub const IMAGE_DERIVATIVES: [DerivativeSpec; 5] = [
    DerivativeSpec {
        name: "full",
        width: 1920,
        height: 1920,
        fit: Fit::Inside,
    },
    DerivativeSpec {
        name: "large",
        width: 1280,
        height: 1280,
        fit: Fit::Inside,
    },
    DerivativeSpec {
        name: "medium",
        width: 800,
        height: 800,
        fit: Fit::Inside,
    },
    DerivativeSpec {
        name: "thumbnail",
        width: 400,
        height: 300,
        fit: Fit::Cover,
    },
    DerivativeSpec {
        name: "preview",
        width: 200,
        height: 200,
        fit: Fit::Cover,
    },
];

pub const IMAGE_QUALITY: u8 = 85;
pub const IMAGE_EXTENSION: &str = "jpg";

pub const VIDEO_THUMBNAIL: DerivativeSpec = DerivativeSpec {
    name: "thumbnail",
    width: 640,
    height: 360,
    fit: Fit::Cover,
};
pub const VIDEO_THUMBNAIL_OFFSET_SECS: u32 = 1;
pub const VIDEO_OPTIMIZED_NAME: &str = "optimized";
pub const VIDEO_EXTENSION: &str = "mp4";
pub const VIDEO_CODEC: &str = "libx264";
pub const VIDEO_CRF: u32 = 23;
pub const VIDEO_PRESET: &str = "medium";

pub fn derivative_file_name(base_name: &str, variant: &str, extension: &str) -> String {
    format!("{base_name}-{variant}.{extension}")
}

pub fn metadata_file_name(base_name: &str) -> String {
    format!("{base_name}-metadata.json")
}

/// Output size for an `Inside` fit. Sources already inside the box keep their size.
pub fn fit_inside(src_width: u32, src_height: u32, box_width: u32, box_height: u32) -> (u32, u32) {
    if src_width == 0 || src_height == 0 {
        return (0, 0);
    }
    if src_width <= box_width && src_height <= box_height {
        return (src_width, src_height);
    }

    let scale = f64::min(
        f64::from(box_width) / f64::from(src_width),
        f64::from(box_height) / f64::from(src_height),
    );
    let width = ((f64::from(src_width) * scale).round() as u32).clamp(1, box_width);
    let height = ((f64::from(src_height) * scale).round() as u32).clamp(1, box_height);
    (width, height)
}

/// Centered crop region of the source plus the final output size for a `Cover` fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverPlan {
    pub crop_x: u32,
    pub crop_y: u32,
    pub crop_width: u32,
    pub crop_height: u32,
    pub out_width: u32,
    pub out_height: u32,
}

/// When the source is smaller than the box, the box shrinks with the same
/// aspect ratio instead of upscaling.
pub fn cover_plan(src_width: u32, src_height: u32, box_width: u32, box_height: u32) -> CoverPlan {
    let shrink = [
        1.0,
        f64::from(src_width) / f64::from(box_width.max(1)),
        f64::from(src_height) / f64::from(box_height.max(1)),
    ]
    .into_iter()
    .fold(f64::INFINITY, f64::min);
    let out_width = ((f64::from(box_width) * shrink).round() as u32).clamp(1, src_width.max(1));
    let out_height = ((f64::from(box_height) * shrink).round() as u32).clamp(1, src_height.max(1));

    let (crop_width, crop_height) =
        if u64::from(src_width) * u64::from(out_height) > u64::from(src_height) * u64::from(out_width) {
            let width = (f64::from(src_height) * f64::from(out_width) / f64::from(out_height)).round();
            ((width as u32).clamp(1, src_width.max(1)), src_height.max(1))
        } else {
            let height = (f64::from(src_width) * f64::from(out_height) / f64::from(out_width)).round();
            (src_width.max(1), (height as u32).clamp(1, src_height.max(1)))
        };

    CoverPlan {
        crop_x: src_width.saturating_sub(crop_width) / 2,
        crop_y: src_height.saturating_sub(crop_height) / 2,
        crop_width,
        crop_height,
        out_width,
        out_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inside_fit_scales_down_preserving_aspect() {
        assert_eq!(fit_inside(4000, 2000, 1920, 1920), (1920, 960));
        assert_eq!(fit_inside(1000, 3000, 800, 800), (267, 800));
    }

    #[test]
    fn inside_fit_never_upscales() {
        for spec in IMAGE_DERIVATIVES.iter().filter(|spec| spec.fit == Fit::Inside) {
            let (width, height) = fit_inside(300, 120, spec.width, spec.height);
            assert_eq!((width, height), (300, 120));
        }
    }

    #[test]
    fn cover_crops_to_fill_the_box() {
        let plan = cover_plan(1600, 900, 400, 300);
        assert_eq!((plan.out_width, plan.out_height), (400, 300));
        assert_eq!(plan.crop_height, 900);
        assert_eq!(plan.crop_width, 1200);
        assert_eq!(plan.crop_x, 200);
        assert_eq!(plan.crop_y, 0);
    }

    #[test]
    fn cover_shrinks_box_for_small_sources() {
        let plan = cover_plan(100, 300, 200, 200);
        assert_eq!((plan.out_width, plan.out_height), (100, 100));
        assert_eq!((plan.crop_width, plan.crop_height), (100, 100));
        assert_eq!(plan.crop_y, 100);
    }

    #[test]
    fn file_names_follow_output_layout() {
        assert_eq!(
            derivative_file_name("hero", "thumbnail", IMAGE_EXTENSION),
            "hero-thumbnail.jpg"
        );
        assert_eq!(metadata_file_name("hero"), "hero-metadata.json");
    }
}
