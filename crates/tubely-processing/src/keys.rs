//! Object key derivation.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::TryRngCore;
use tubely_core::models::{ObjectKey, Orientation};
use uuid::Uuid;

/// Bytes of entropy in the random key component.
pub const KEY_ENTROPY_BYTES: usize = 32;

/// Source of unpredictable bytes for object keys.
pub trait RandomSource: Send + Sync {
    fn fill(&self, buf: &mut [u8]) -> Result<(), String>;
}

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<(), String> {
        OsRng.try_fill_bytes(buf).map_err(|e| e.to_string())
    }
}

/// Where the random component of a key came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Random,
    /// The random source failed and the record id was used instead.
    Fallback { reason: String },
}

impl KeySource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, KeySource::Fallback { .. })
    }
}

#[derive(Debug, Clone)]
pub struct KeyDerivation {
    pub key: ObjectKey,
    pub source: KeySource,
}

/// Builds `[orientation/]<random>.<ext>` keys.
#[derive(Clone)]
pub struct KeyDeriver {
    random: Arc<dyn RandomSource>,
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new(Arc::new(OsRandom))
    }
}

impl KeyDeriver {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    pub fn derive_key(
        &self,
        extension: &str,
        orientation: Option<Orientation>,
        fallback_id: Uuid,
    ) -> KeyDerivation {
        let mut bytes = [0u8; KEY_ENTROPY_BYTES];
        let (random_component, source) = match self.random.fill(&mut bytes) {
            Ok(()) => (URL_SAFE_NO_PAD.encode(bytes), KeySource::Random),
            Err(reason) => {
                tracing::warn!(
                    error = %reason,
                    fallback_id = %fallback_id,
                    "Random source unavailable, using record id for object key"
                );
                (fallback_id.to_string(), KeySource::Fallback { reason })
            }
        };

        KeyDerivation {
            key: ObjectKey {
                namespace: orientation,
                random_component,
                extension: extension.to_string(),
            },
            source,
        }
    }
}
