//! Container image reference parsing.
//!
//! The resolver derives the driver repository and image name from the
//! reference the GPU operator CSV declares. Only the split the reconciler
//! needs is implemented here; references that do not split confidently are
//! passed through verbatim.

/// Outcome of splitting an image reference declared by a CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// `registry/namespace/name` pinned by a digest or tag.
    Canonical {
        /// Everything up to the final path component, e.g. "nvcr.io/nvidia"
        repository: String,
        /// Final path component, e.g. "driver"
        image: String,
    },
    /// Anything else; used as the image field verbatim.
    Opaque(String),
}

impl ImageReference {
    /// Splits `registry/namespace/name@digest` (or `:tag`) into repository
    /// and image name. The pin itself is dropped: a digest- or tag-pinned
    /// reference carries no separate driver version.
    pub fn parse(reference: &str) -> Self {
        let unpinned = match reference.rsplit_once('@') {
            Some((before_digest, _)) => before_digest,
            None => strip_tag(reference),
        };

        match unpinned.rsplit_once('/') {
            Some((repository, image)) if !repository.is_empty() && !image.is_empty() => {
                ImageReference::Canonical {
                    repository: repository.to_string(),
                    image: image.to_string(),
                }
            }
            _ => ImageReference::Opaque(reference.to_string()),
        }
    }
}

/// A ':' only separates a tag after the last '/'; registry hosts use ':'
/// for ports.
fn strip_tag(reference: &str) -> &str {
    match reference.rfind(':') {
        Some(pos) if pos > reference.rfind('/').unwrap_or(0) => &reference[..pos],
        _ => reference,
    }
}
