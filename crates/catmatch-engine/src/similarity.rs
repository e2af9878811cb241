use crate::normalize::normalize;

/// Bounded similarity between two reference or name strings.
///
/// Both inputs are normalized first, then the first matching rule wins:
///
/// 1. either side empty: `0.0`
/// 2. identical: `1.0`
/// 3. one contains the other: `len(shorter) / len(longer)`
/// 4. otherwise `1 - levenshtein / max(len)`, clamped to `[0, 1]`
///
/// Lengths and edit distance are counted in characters. Symmetric in its
/// arguments.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_similarity(&normalize(a), &normalize(b))
}

/// [`similarity`] for inputs that are already in normalized form.
#[must_use]
pub(crate) fn normalized_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let len_a = a.chars().count();
    let len_b = b.chars().count();

    if a.contains(b) || b.contains(a) {
        let (shorter, longer) = if len_a <= len_b {
            (len_a, len_b)
        } else {
            (len_b, len_a)
        };
        #[allow(clippy::cast_precision_loss)]
        return shorter as f64 / longer as f64;
    }

    let distance = strsim::levenshtein(a, b);
    let max_len = len_a.max(len_b);
    #[allow(clippy::cast_precision_loss)]
    let score = 1.0 - distance as f64 / max_len as f64;
    score.clamp(0.0, 1.0)
}
