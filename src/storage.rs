//! Object-storage bucket registry and public URL resolution.
//!
//! Product imagery lives in per-category buckets with a shared fallback
//! list; customer design uploads live in their own bucket. Resolution never
//! fails: unusable references degrade to the placeholder graphic.

pub const PLACEHOLDER_IMAGE_URL: &str = "/static/placeholder-product.png";

const UPLOAD_BUCKET: &str = "design-uploads";
const UPLOAD_ROOT_MARKER: &str = "/design-uploads/";

const SECONDARY_BUCKETS: [&str; 3] = ["product-assets", "catalog-assets", "legacy-assets"];

#[derive(Debug, Clone)]
pub struct StorageConfig {
    public_base: String,
}

impl StorageConfig {
    pub fn new(public_base: impl Into<String>) -> Self {
        Self {
            public_base: public_base.into(),
        }
    }

    pub fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{}/{}", self.public_base.trim_end_matches('/'), bucket, key)
    }

    /// Resolve an opaque image reference to a fetchable URL. Pre-formed
    /// URLs and absolute paths pass through; storage keys are probed
    /// against the category bucket first, then the secondary buckets.
    pub fn resolve_image(&self, reference: &str, category_hint: &str) -> String {
        let reference = reference.trim();
        if reference.is_empty() {
            return PLACEHOLDER_IMAGE_URL.to_string();
        }
        if has_uri_scheme(reference) || reference.starts_with('/') {
            return reference.to_string();
        }

        let key = reference.trim_start_matches('/');
        let probe_order = primary_bucket(category_hint)
            .into_iter()
            .chain(SECONDARY_BUCKETS);
        for bucket in probe_order {
            let url = self.public_url(bucket, key);
            if is_usable_url(&url) {
                return url;
            }
        }
        PLACEHOLDER_IMAGE_URL.to_string()
    }

    /// Resolve a design-upload reference. The storage key is whatever
    /// follows the upload-root marker; without the marker the whole
    /// (leading-slash-stripped) reference is the key. Falls back to the
    /// original input when no usable key remains.
    pub fn resolve_uploaded_file_url(&self, reference: &str) -> String {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return reference.to_string();
        }
        let key = match reference.find(UPLOAD_ROOT_MARKER) {
            Some(pos) => &reference[pos + UPLOAD_ROOT_MARKER.len()..],
            None => reference.trim_start_matches('/'),
        };
        if key.is_empty() {
            return reference.to_string();
        }
        self.public_url(UPLOAD_BUCKET, key)
    }
}

fn has_uri_scheme(reference: &str) -> bool {
    match reference.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
        }
        None => false,
    }
}

// A URL ending in a path separator carries an unresolved key.
fn is_usable_url(url: &str) -> bool {
    !url.is_empty() && !url.ends_with('/')
}

fn primary_bucket(category_hint: &str) -> Option<&'static str> {
    let hint = category_hint.to_lowercase();
    if hint.contains("apparel") || hint.contains("shirt") || hint.contains("hoodie") {
        Some("apparel-assets")
    } else if hint.contains("accessor") {
        Some("accessory-assets")
    } else if hint.contains("signage") || hint.contains("poster") {
        Some("signage-assets")
    } else if hint.contains("card") || hint.contains("sticker") {
        Some("card-assets")
    } else if hint.contains("packag") {
        Some("packaging-assets")
    } else if hint.contains("3d") || hint.contains("3-d") {
        Some("print3d-assets")
    } else {
        None
    }
}
