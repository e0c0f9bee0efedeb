use std::fmt::Write as _;
use std::path::Path;

use crate::{classify_project, KeywordTable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryProject {
    pub tag: String,
    pub display_name: String,
    pub images: Vec<String>,
}

pub fn gallery_file_name(tag: &str) -> String {
    format!("{tag}-gallery.html")
}

/// Groups image names by gallery project. Projects appear in order of their
/// first image and images keep their input order.
pub fn group_by_project(table: &KeywordTable, image_names: &[String]) -> Vec<GalleryProject> {
    let mut projects: Vec<GalleryProject> = Vec::new();
    for name in image_names {
        let stem = Path::new(name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let tag = classify_project(table, &stem);
        match projects.iter_mut().find(|project| project.tag == tag) {
            Some(project) => project.images.push(name.clone()),
            None => projects.push(GalleryProject {
                display_name: table.display_name(&tag),
                tag,
                images: vec![name.clone()],
            }),
        }
    }
    projects
}

/// `BMGF_Gates_Widget_20_share.png` becomes `Bmgf Gates Widget 20 Share`.
pub fn title_from_filename(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    title_case(&stem)
}

pub fn title_case(raw: &str) -> String {
    raw.replace(['_', '-', '.'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Renders one self-contained gallery page. Returns `None` for a project
/// without images.
pub fn render_project_gallery(project: &GalleryProject, image_base_url: &str) -> Option<String> {
    if project.images.is_empty() {
        return None;
    }

    let base = image_base_url.trim_end_matches('/');
    let name = escape_html(&project.display_name);
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{name} Gallery</title>
<style>
body {{ margin: 0; font-family: system-ui, sans-serif; background: #0f0f10; color: #f2f2f2; }}
header {{ padding: 48px 24px 16px; }}
.grid {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 24px; padding: 24px; }}
figure {{ margin: 0; }}
img {{ width: 100%; height: auto; border-radius: 8px; display: block; }}
figcaption {{ margin-top: 8px; font-size: 14px; opacity: 0.8; }}
</style>
</head>
<body>
<header><h1>{name}</h1><p>{count} images</p></header>
<main class="grid" data-project="{tag}">
"#,
        count = project.images.len(),
        tag = escape_html(&project.tag),
    );

    for image in &project.images {
        let title = escape_html(&title_from_filename(image));
        let src = if base.is_empty() {
            escape_html(image)
        } else {
            escape_html(&format!("{base}/{image}"))
        };
        let _ = writeln!(
            html,
            r#"<figure><img src="{src}" alt="{title}" loading="lazy"><figcaption>{title}</figcaption></figure>"#
        );
    }

    html.push_str("</main>\n</body>\n</html>\n");
    Some(html)
}
