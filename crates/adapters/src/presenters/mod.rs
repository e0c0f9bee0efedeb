use folio_application::{GalleryReport, NavigationReport, ProcessOutcome};
use folio_domain::ClassificationResult;

pub fn present_outcome(outcome: &ProcessOutcome) -> String {
    match outcome {
        ProcessOutcome::Processed {
            source,
            project,
            output_dir,
            derivatives,
        } => format!(
            "processed {} -> {} (project={}, {} derivatives)",
            source.display(),
            output_dir.display(),
            project,
            derivatives.len()
        ),
        ProcessOutcome::Unsupported { source } => {
            format!("skipped {} (unsupported media type)", source.display())
        }
        ProcessOutcome::Failed { source, error } => {
            format!("failed {}: {}", source.display(), error)
        }
    }
}

pub fn present_classification(name: &str, result: &ClassificationResult) -> String {
    format!(
        "{}\tproject={}\ttags={}",
        name,
        result.project,
        result.tags.join(",")
    )
}

pub fn present_gallery_report(report: &GalleryReport) -> String {
    let mut lines = vec![format!(
        "scanned {} images, wrote {} gallery pages",
        report.scanned_images,
        report.pages.len()
    )];
    lines.extend(report.pages.iter().map(|page| format!("  {}", page.display())));
    lines.join("\n")
}

pub fn present_navigation_report(report: &NavigationReport) -> String {
    let mut lines = vec![format!(
        "navigation: {} updated, {} unchanged",
        report.updated, report.unchanged
    )];
    for slug in &report.missing {
        lines.push(format!("  missing page: {slug}"));
    }
    for slug in &report.skipped {
        lines.push(format!("  skipped (no </body>): {slug}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn outcome_lines_name_the_source() {
        let processed = ProcessOutcome::Processed {
            source: PathBuf::from("/inbox/tmobile-hero.png"),
            project: "tmobile".to_string(),
            output_dir: PathBuf::from("/processed/tmobile/tmobile-hero"),
            derivatives: vec!["tmobile-hero-full.jpg".to_string()],
        };
        assert_eq!(
            present_outcome(&processed),
            "processed /inbox/tmobile-hero.png -> /processed/tmobile/tmobile-hero (project=tmobile, 1 derivatives)"
        );

        let failed = ProcessOutcome::Failed {
            source: PathBuf::from("/inbox/x.png"),
            error: "decode failed".to_string(),
        };
        assert_eq!(present_outcome(&failed), "failed /inbox/x.png: decode failed");
    }

    #[test]
    fn classification_is_tab_separated() {
        let result = ClassificationResult {
            project: "microsoft".to_string(),
            tags: vec!["Mobile".to_string(), "Dashboard".to_string()],
        };
        assert_eq!(
            present_classification("xbox-mobile-dashboard.png", &result),
            "xbox-mobile-dashboard.png\tproject=microsoft\ttags=Mobile,Dashboard"
        );
    }

    #[test]
    fn navigation_report_lists_problems() {
        let report = NavigationReport {
            updated: 2,
            unchanged: 1,
            missing: vec!["nike-case-study".to_string()],
            skipped: vec![],
        };
        assert_eq!(
            present_navigation_report(&report),
            "navigation: 2 updated, 1 unchanged\n  missing page: nike-case-study"
        );
    }
}
