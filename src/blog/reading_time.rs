/// Average adult reading speed used for the estimate.
const WORDS_PER_MINUTE: usize = 200;

/// Estimated minutes to read `content`, never less than one.
pub fn reading_time_minutes(content: &str) -> i32 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_content_rounds_up_to_one_minute() {
        assert_eq!(reading_time_minutes(""), 1);
        assert_eq!(reading_time_minutes("just a few words"), 1);
    }

    #[test]
    fn test_partial_minutes_round_up() {
        let content = "word ".repeat(201);
        assert_eq!(reading_time_minutes(&content), 2);
        let content = "word ".repeat(400);
        assert_eq!(reading_time_minutes(&content), 2);
    }
}
