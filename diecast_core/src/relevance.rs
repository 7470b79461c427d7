//! Fuzzy title-vs-query relevance gate.
//!
//! Adapters use [`is_relevant`] to drop unrelated items that shop search pages
//! tend to pad their results with (accessories, "you may also like", etc.).

/// Default minimum score for a title to count as relevant.
pub const DEFAULT_RELEVANCE_THRESHOLD: u8 = 90;

/// Returns true when `title` matches `query` with a partial similarity score
/// of at least `threshold` (0-100). Comparison is case-insensitive.
///
/// Empty input on either side is never relevant.
pub fn is_relevant(title: &str, query: &str, threshold: u8) -> bool {
    let title = title.trim().to_lowercase();
    let query = query.trim().to_lowercase();
    if title.is_empty() || query.is_empty() {
        return false;
    }
    partial_ratio(&query, &title) >= threshold
}

/// Best similarity of the shorter string against every same-length window of
/// the longer one, in the range 0..=100.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    let width = short.len();

    let mut best = 0;
    for start in 0..=(long.len() - width) {
        let score = ratio(short, &long[start..start + width]);
        if score > best {
            best = score;
            if best == 100 {
                break;
            }
        }
    }
    best
}

/// Indel similarity: `2 * LCS / (len_a + len_b)`, scaled to 0..=100 and rounded.
fn ratio(a: &[char], b: &[char]) -> u8 {
    let total = a.len() + b.len();
    if total == 0 {
        return 0;
    }
    let lcs = lcs_len(a, b);
    ((200 * lcs + total / 2) / total) as u8
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
