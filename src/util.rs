const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over the UTF-8 bytes of `text`; stable across platforms and releases.
pub fn stable_hash(text: &str) -> u64 {
    text.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
    })
}

pub fn format_similarity(similarity: f64) -> String {
    format!("{similarity:.4}")
}

pub fn format_matrix_cell(value: f64) -> String {
    format!("{value:.5}")
}

pub fn short_label(id: &str, max_chars: usize) -> String {
    if id.chars().count() <= max_chars {
        return id.to_string();
    }

    let mut label = id.chars().take(max_chars.saturating_sub(1)).collect::<String>();
    label.push('…');
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_hash_matches_reference_vectors() {
        assert_eq!(stable_hash(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(stable_hash("a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn matrix_cells_use_five_decimals() {
        assert_eq!(format_matrix_cell(0.123456), "0.12346");
        assert_eq!(format_matrix_cell(1.0), "1.00000");
        assert_eq!(format_matrix_cell(f64::NAN), "NaN");
    }

    #[test]
    fn short_label_truncates_long_ids() {
        assert_eq!(short_label("GO:0008150", 20), "GO:0008150");
        assert_eq!(short_label("GO:0008150", 5), "GO:0…");
    }
}
