use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{CarouselError, CarouselResult};
use crate::render::surface::EncodedImage;

/// Default archive name used by export.
pub const DEFAULT_ARCHIVE_NAME: &str = "carousel-export";

/// Entry name of slide `index` (0-based): `slide-<index + 1>.<ext>`.
pub fn slide_entry_name(index: usize, extension: &str) -> String {
    format!("slide-{}.{extension}", index + 1)
}

/// Sink contract for packaging exported slides.
///
/// Ordering contract: `push_entry` is called once per slide in slide order, between one `begin`
/// and one `finish`.
pub trait ArchiveSink {
    /// Start a new archive called `name`.
    fn begin(&mut self, name: &str) -> CarouselResult<()>;
    /// Add one named entry.
    fn push_entry(&mut self, entry_name: &str, image: &EncodedImage) -> CarouselResult<()>;
    /// Seal the archive.
    fn finish(&mut self) -> CarouselResult<()>;
}

/// Push `slides` into `sink` as `slide-1.<ext>`, `slide-2.<ext>`, ... Returns the entry names.
pub fn package_slides<K: ArchiveSink + ?Sized>(
    sink: &mut K,
    name: &str,
    slides: &[EncodedImage],
) -> CarouselResult<Vec<String>> {
    sink.begin(name)?;
    let mut names = Vec::with_capacity(slides.len());
    for (i, image) in slides.iter().enumerate() {
        let entry = slide_entry_name(i, image.encoding.extension());
        sink.push_entry(&entry, image)?;
        names.push(entry);
    }
    sink.finish()?;
    tracing::info!(archive = name, entries = names.len(), "archive packaged");
    Ok(names)
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemoryArchive {
    name: Option<String>,
    entries: Vec<(String, EncodedImage)>,
    finished: bool,
}

impl InMemoryArchive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name given to `begin`, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Entries in push order.
    pub fn entries(&self) -> &[(String, EncodedImage)] {
        &self.entries
    }

    /// Entry names in push order.
    pub fn entry_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// `true` once `finish` ran.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl ArchiveSink for InMemoryArchive {
    fn begin(&mut self, name: &str) -> CarouselResult<()> {
        self.name = Some(name.to_owned());
        self.entries.clear();
        self.finished = false;
        Ok(())
    }

    fn push_entry(&mut self, entry_name: &str, image: &EncodedImage) -> CarouselResult<()> {
        if self.finished {
            return Err(CarouselError::encode("archive already finished"));
        }
        self.entries.push((entry_name.to_owned(), image.clone()));
        Ok(())
    }

    fn finish(&mut self) -> CarouselResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Writes each entry as a file under `<root>/<archive name>/`.
///
/// Reusing a name replaces the earlier export: `slide-*` files already in the directory are
/// removed when the archive begins. Other files are left alone.
#[derive(Debug)]
pub struct DirArchive {
    root: PathBuf,
    current: Option<PathBuf>,
    written: Vec<PathBuf>,
}

impl DirArchive {
    /// Archives land under `root`, which is created on demand.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            current: None,
            written: Vec::new(),
        }
    }

    /// Directory of the archive in progress or last finished.
    pub fn archive_dir(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

fn clear_slide_entries(dir: &Path) -> CarouselResult<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("list archive dir '{}'", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("list archive dir '{}'", dir.display()))?;
        let stale = entry.file_name().to_str().is_some_and(|n| n.starts_with("slide-"));
        if stale && entry.path().is_file() {
            let path = entry.path();
            std::fs::remove_file(&path)
                .with_context(|| format!("remove stale entry '{}'", path.display()))?;
            tracing::debug!(path = %path.display(), "stale archive entry removed");
        }
    }
    Ok(())
}

impl ArchiveSink for DirArchive {
    fn begin(&mut self, name: &str) -> CarouselResult<()> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(CarouselError::validation(format!(
                "archive name must be a plain file name, got \"{name}\""
            )));
        }
        let dir = self.root.join(name);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create archive dir '{}'", dir.display()))?;
        clear_slide_entries(&dir)?;
        self.current = Some(dir);
        self.written.clear();
        Ok(())
    }

    fn push_entry(&mut self, entry_name: &str, image: &EncodedImage) -> CarouselResult<()> {
        let dir = self
            .current
            .as_ref()
            .ok_or_else(|| CarouselError::encode("push_entry called before begin"))?;
        let path = dir.join(entry_name);
        std::fs::write(&path, &image.bytes)
            .with_context(|| format!("write archive entry '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = image.bytes.len(), "archive entry written");
        self.written.push(path);
        Ok(())
    }

    fn finish(&mut self) -> CarouselResult<()> {
        if self.current.is_none() {
            return Err(CarouselError::encode("finish called before begin"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/archive.rs"]
mod tests;
