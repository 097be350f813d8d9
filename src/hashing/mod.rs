use blake3::Hasher;

/// Hashes raw question text (no normalisation) into a 32-byte cache key.
#[inline]
pub fn hash_text(text: &str) -> [u8; 32] {
    *blake3::hash(text.as_bytes()).as_bytes()
}

/// Fingerprints an embedding by hashing its in-memory `f32` bytes.
///
/// Two embeddings share a fingerprint only if they are bit-identical, so
/// `-0.0` and `0.0` produce different fingerprints. Native byte order is fine
/// here since fingerprints never leave the process.
#[inline]
pub fn embedding_fingerprint(embedding: &[f32]) -> [u8; 32] {
    *blake3::hash(bytemuck::cast_slice::<f32, u8>(embedding)).as_bytes()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Used for feature hashing in the lexical embedder, where rare collisions only
/// blur two tokens together.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Key for the similarity-result cache.
///
/// Covers the store epoch, category, neighbour count and the query embedding,
/// so results computed for `k = 3` are never served to a full-category scan.
#[inline]
pub fn similarity_key(epoch: u64, category: &str, k: usize, fingerprint: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Hasher::new();
    hasher.update(&epoch.to_le_bytes());
    hasher.update(&(category.len() as u64).to_le_bytes());
    hasher.update(category.as_bytes());
    hasher.update(&(k as u64).to_le_bytes());
    hasher.update(fingerprint);
    *hasher.finalize().as_bytes()
}

/// Digest over the sidecar content of a persisted index.
pub fn sidecar_digest(
    category: &str,
    questions: &[String],
    answers: &[String],
    embeddings: &[f32],
) -> [u8; 32] {
    let mut hasher = Hasher::new();
    hasher.update(&(category.len() as u64).to_le_bytes());
    hasher.update(category.as_bytes());
    hasher.update(&(questions.len() as u64).to_le_bytes());
    for (question, answer) in questions.iter().zip(answers) {
        hasher.update(&(question.len() as u64).to_le_bytes());
        hasher.update(question.as_bytes());
        hasher.update(&(answer.len() as u64).to_le_bytes());
        hasher.update(answer.as_bytes());
    }
    for value in embeddings {
        hasher.update(&value.to_le_bytes());
    }
    *hasher.finalize().as_bytes()
}
