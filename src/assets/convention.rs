use crate::foundation::{
    core::{FrameIndex, ViewportClass},
    error::{FilmrollError, FilmrollResult},
};

/// Where one viewport class keeps its frames.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssetConvention {
    /// Folder under the asset root, without slashes.
    pub folder: String,
    /// File extension without the dot.
    pub extension: String,
}

impl AssetConvention {
    pub fn new(folder: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            extension: extension.into(),
        }
    }
}

/// Asset conventions for both viewport classes plus the shared file name prefix.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConventionTable {
    /// Convention for compact viewports.
    pub compact: AssetConvention,
    /// Convention for wide viewports.
    pub wide: AssetConvention,
    /// File name prefix before the 3-digit ordinal.
    pub prefix: String,
}

impl Default for ConventionTable {
    fn default() -> Self {
        Self {
            compact: AssetConvention::new("frames-mobile", "png"),
            wide: AssetConvention::new("frames", "jpg"),
            prefix: "frame-".to_string(),
        }
    }
}

impl ConventionTable {
    pub fn validate(&self) -> FilmrollResult<()> {
        for (class, conv) in [
            (ViewportClass::Compact, &self.compact),
            (ViewportClass::Wide, &self.wide),
        ] {
            if conv.folder.is_empty() || conv.folder.contains(['/', '\\']) || conv.folder == ".."
            {
                return Err(FilmrollError::validation(format!(
                    "{class} folder must be a single non-empty path segment, got '{}'",
                    conv.folder
                )));
            }
            if conv.extension.is_empty() || conv.extension.contains(['.', '/', '\\']) {
                return Err(FilmrollError::validation(format!(
                    "{class} extension must be non-empty without dots, got '{}'",
                    conv.extension
                )));
            }
        }
        if self.prefix.contains(['/', '\\']) {
            return Err(FilmrollError::validation(
                "frame file prefix must not contain path separators",
            ));
        }
        Ok(())
    }

    pub fn for_class(&self, class: ViewportClass) -> &AssetConvention {
        match class {
            ViewportClass::Compact => &self.compact,
            ViewportClass::Wide => &self.wide,
        }
    }

    /// `/{folder}/{prefix}{ordinal:03}.{ext}` using the class's primary extension.
    pub fn frame_path(&self, class: ViewportClass, index: FrameIndex) -> String {
        self.frame_path_with_ext(class, index, &self.for_class(class).extension)
    }

    /// Same as [`ConventionTable::frame_path`] with an explicit extension.
    pub fn frame_path_with_ext(
        &self,
        class: ViewportClass,
        index: FrameIndex,
        ext: &str,
    ) -> String {
        let conv = self.for_class(class);
        format!("/{}/{}{:03}.{}", conv.folder, self.prefix, index.ordinal(), ext)
    }

    /// All `count` primary paths for `class`, in slot order.
    pub fn request_paths(&self, class: ViewportClass, count: u32) -> Vec<String> {
        (0..count)
            .map(|i| self.frame_path(class, FrameIndex(i)))
            .collect()
    }
}

/// The one-shot fallback: a failed `.png` frame is retried once as `.jpg`.
///
/// No other extension has a fallback.
pub fn fallback_extension(ext: &str) -> Option<&'static str> {
    if ext.eq_ignore_ascii_case("png") {
        Some("jpg")
    } else {
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/convention.rs"]
mod tests;
