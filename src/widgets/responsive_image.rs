//! `<img>` with a `srcset`, built from the image pipeline's manifest entry.

use serde::{Deserialize, Serialize};

use crate::dom::{Dom, NodeId};
use crate::html;
use crate::template::{escape, TemplateError};

/// One rendition of a responsive image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVariant {
    pub width: u32,
    pub height: u32,
    pub path: String,
}

/// Manifest entry for a responsive image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsiveImageInfo {
    pub src_set: String,
    #[serde(default)]
    pub images: Vec<ImageVariant>,
    pub src: String,
}

impl ResponsiveImageInfo {
    /// Build an entry from renditions, using the widest as the fallback `src`.
    pub fn from_variants(images: Vec<ImageVariant>) -> Option<Self> {
        let src = images.iter().max_by_key(|i| i.width)?.path.clone();
        let src_set = images
            .iter()
            .map(|i| format!("{} {}w", i.path, i.width))
            .collect::<Vec<_>>()
            .join(",");
        Some(Self {
            src_set,
            images,
            src,
        })
    }
}

pub fn responsive_image(
    dom: &Dom,
    info: &ResponsiveImageInfo,
    alt: Option<&str>,
) -> Result<NodeId, TemplateError> {
    html!(
        dom,
        r#"<img srcset="{}" src="{}" alt="{}">"#,
        escape(&info.src_set),
        escape(&info.src),
        escape(alt.unwrap_or_default()),
    )
}
