use regex::Regex;
use std::sync::LazyLock;

// 最多支援一層巢狀物件
static JSON_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(?:[^{}]*|\{.*?\})*\}").expect("JSON object pattern is valid")
});

/// 取出區塊中最後一個完整的 JSON 物件。
///
/// Serial chunks often start or end in the middle of a message, so only
/// balanced `{...}` spans count and the last one wins.
pub fn clean_data(input: &str) -> Option<String> {
    JSON_OBJECT
        .find_iter(input)
        .last()
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_object() {
        assert_eq!(
            clean_data(r#"{"temp":21.5}"#).as_deref(),
            Some(r#"{"temp":21.5}"#)
        );
    }

    #[test]
    fn test_last_object_wins() {
        let input = "noise{\"seq\":1}\r\n{\"seq\":2}\r\n";
        assert_eq!(clean_data(input).as_deref(), Some("{\"seq\":2}"));
    }

    #[test]
    fn test_truncated_tail_is_ignored() {
        let input = "{\"seq\":1,\"v\":3}\n{\"seq\":2,\"v\"";
        assert_eq!(clean_data(input).as_deref(), Some("{\"seq\":1,\"v\":3}"));
    }

    #[test]
    fn test_truncated_head_is_ignored() {
        let input = "q\":7}{\"seq\":8}";
        assert_eq!(clean_data(input).as_deref(), Some("{\"seq\":8}"));
    }

    #[test]
    fn test_nested_object() {
        let input = "xx{\"a\":1}{\"b\":{\"c\":2}}tail";
        assert_eq!(clean_data(input).as_deref(), Some("{\"b\":{\"c\":2}}"));
    }

    #[test]
    fn test_no_object() {
        assert_eq!(clean_data("OK\r\nREADY\r\n"), None);
        assert_eq!(clean_data(""), None);
        assert_eq!(clean_data("{\"open\": true"), None);
    }
}
