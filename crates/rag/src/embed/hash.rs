//! Deterministic local embeddings from hashed text features.
//!
//! Words and their character trigrams are hashed into a fixed-width vector
//! which is then L2-normalized. The result is nowhere near a neural
//! embedding semantically, but shared vocabulary still scores higher than
//! unrelated text, it needs no external service, and identical input always
//! produces identical output. That determinism is what ingestion tests and
//! offline use rely on.

use lectern_core::AppResult;

use super::EmbeddingProvider;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "her", "was", "one", "our",
    "out", "his", "has", "have", "this", "that", "with", "from", "they", "been", "will", "what",
    "when", "where", "which", "their", "there",
];

/// Hash-based embedding provider.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();

        let mut counts: std::collections::HashMap<&str, u32> = std::collections::HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 2 && !STOP_WORDS.contains(w))
        {
            *counts.entry(word).or_insert(0) += 1;
        }

        for (word, count) in &counts {
            let weight = *count as f32;
            let slot = (fnv1a(word.as_bytes()) as usize) % self.dimensions;
            vector[slot] += weight;

            let chars: Vec<char> = word.chars().collect();
            for trigram in chars.windows(3) {
                let mut buf = [0u8; 12];
                let mut len = 0;
                for c in trigram {
                    len += c.encode_utf8(&mut buf[len..]).len();
                }
                let slot = (fnv1a(&buf[..len]) as usize) % self.dimensions;
                vector[slot] += weight.sqrt();
            }
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn provider_name(&self) -> &str {
        "hash"
    }

    fn model_name(&self) -> &str {
        "hash-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
