//! Normalized edit-distance similarity scores on a 0-100 scale

/// Similarity of two whole strings, 0-100
pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() && b.is_empty() {
        return 100;
    }
    scale(strsim::normalized_levenshtein(a, b))
}

/// Best similarity of the shorter string against every equally long window
/// of the longer one, 0-100
///
/// A short rule name fully contained in a long title scores 100.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (short, long) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };

    if short.is_empty() {
        return 0;
    }
    if short.len() == long.len() {
        return ratio(a, b);
    }

    let needle: String = short.iter().collect();
    let mut best = 0.0_f64;
    for window in long.windows(short.len()) {
        let candidate: String = window.iter().collect();
        let score = strsim::normalized_levenshtein(&needle, &candidate);
        if score > best {
            best = score;
            if best >= 1.0 {
                break;
            }
        }
    }
    scale(best)
}

fn scale(score: f64) -> u8 {
    (score * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("ABC", "ABC"), 100);
        assert_eq!(ratio("", ""), 100);
        assert_eq!(ratio("ABCD", "ABCE"), 75);
    }

    #[test]
    fn test_partial_ratio_contained() {
        assert_eq!(partial_ratio("車修", "本體再生車修(2SET)"), 100);
        assert_eq!(partial_ratio("本體再生車修(2SET)", "車修"), 100);
    }

    #[test]
    fn test_partial_ratio_unrelated() {
        assert!(partial_ratio("ROLL銲補", "軸頸研磨") < 50);
        assert_eq!(partial_ratio("", "anything"), 0);
    }

    #[test]
    fn test_partial_ratio_near_match() {
        // one differing char in a window of ten
        let score = partial_ratio("ROLLRECOND", "XXROLLRECONXYY");
        assert_eq!(score, 90);
    }
}
