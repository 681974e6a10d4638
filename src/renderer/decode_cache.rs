use std::collections::{HashMap, HashSet};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use thiserror::Error;
use tiny_skia::{IntSize, Pixmap};

/// Identity of an encoded image, derived from its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(u64);

impl ContentHash {
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        bytes.len().hash(&mut hasher);
        bytes.hash(&mut hasher);
        Self(hasher.finish())
    }
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid image dimensions {0}x{1}")]
    InvalidDimensions(u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    Pending,
    Ready,
    Failed,
}

enum DecodeEntry {
    Pending(Vec<u8>),
    Ready(Arc<Pixmap>),
    Failed,
}

/// Decoded rasters keyed by content identity.
///
/// Entries start out pending when first requested and are decoded together
/// by [`DecodeCache::resolve_pending`].
#[derive(Default)]
pub struct DecodeCache {
    entries: HashMap<ContentHash, DecodeEntry>,
}

impl std::fmt::Debug for DecodeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeCache")
            .field("entries", &self.entries.len())
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl DecodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `bytes` for decoding unless they are already known.
    pub fn request(&mut self, bytes: &[u8]) -> ContentHash {
        let hash = ContentHash::of(bytes);
        self.entries
            .entry(hash)
            .or_insert_with(|| DecodeEntry::Pending(bytes.to_vec()));
        hash
    }

    pub fn status(&self, hash: ContentHash) -> Option<DecodeStatus> {
        self.entries.get(&hash).map(|entry| match entry {
            DecodeEntry::Pending(_) => DecodeStatus::Pending,
            DecodeEntry::Ready(_) => DecodeStatus::Ready,
            DecodeEntry::Failed => DecodeStatus::Failed,
        })
    }

    pub fn get(&self, hash: ContentHash) -> Option<&Pixmap> {
        match self.entries.get(&hash) {
            Some(DecodeEntry::Ready(pixmap)) => Some(pixmap),
            _ => None,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry, DecodeEntry::Pending(_)))
            .count()
    }

    /// True when none of `hashes` is unknown or still pending.
    pub fn all_resolved(&self, hashes: &[ContentHash]) -> bool {
        hashes.iter().all(|hash| {
            matches!(
                self.status(*hash),
                Some(DecodeStatus::Ready | DecodeStatus::Failed)
            )
        })
    }

    /// Decodes every pending entry and waits for all of them.
    pub async fn resolve_pending(&mut self) {
        let pending: Vec<(ContentHash, Vec<u8>)> = self
            .entries
            .iter_mut()
            .filter_map(|(hash, entry)| match entry {
                DecodeEntry::Pending(bytes) => Some((*hash, std::mem::take(bytes))),
                _ => None,
            })
            .collect();
        if pending.is_empty() {
            return;
        }

        let decodes = pending
            .into_iter()
            .map(|(hash, bytes)| async move { (hash, decode_to_pixmap(&bytes)) });
        for (hash, result) in futures::future::join_all(decodes).await {
            let entry = match result {
                Ok(pixmap) => DecodeEntry::Ready(Arc::new(pixmap)),
                Err(err) => {
                    log::warn!("Dropping undecodable image {:?}: {}", hash, err);
                    DecodeEntry::Failed
                }
            };
            self.entries.insert(hash, entry);
        }
    }

    /// Evicts every entry not in `live`.
    pub fn retain(&mut self, live: &HashSet<ContentHash>) {
        self.entries.retain(|hash, _| live.contains(hash));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Decodes PNG/JPEG/WEBP bytes into a premultiplied pixmap.
pub fn decode_to_pixmap(bytes: &[u8]) -> Result<Pixmap, DecodeError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    let size = IntSize::from_wh(width, height)
        .ok_or(DecodeError::InvalidDimensions(width, height))?;

    let mut data = rgba.into_raw();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(data, size).ok_or(DecodeError::InvalidDimensions(width, height))
}
