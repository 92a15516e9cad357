//! 姓名与表头归一化工具
//!
//! 设备端与 Excel 导入的姓名字段来源杂乱，统一在这里裁剪、拆分与拼装。

use crate::models::students::entities::Gender;

/// 归一化表头：去掉前导星号、裁剪空白并转小写
pub fn normalize_header(value: &str) -> String {
    value
        .trim()
        .trim_start_matches('*')
        .trim()
        .to_lowercase()
}

/// 归一化姓名片段（仅裁剪空白）
pub fn normalize_name_part(value: &str) -> String {
    value.trim().to_string()
}

/// 拼装全名：姓在前名在后，空片段丢弃
pub fn build_full_name(last_name: &str, first_name: &str) -> String {
    let parts: Vec<String> = [normalize_name_part(last_name), normalize_name_part(first_name)]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect();
    parts.join(" ").trim().to_string()
}

/// 拆分全名为 (first_name, last_name)
///
/// 单个词视为名；多个词时第一个词为姓，其余为名。
pub fn split_full_name(full_name: &str) -> (String, String) {
    let cleaned = normalize_name_part(full_name);
    if cleaned.is_empty() {
        return (String::new(), String::new());
    }
    let parts: Vec<&str> = cleaned.split_whitespace().collect();
    if parts.len() == 1 {
        return (parts[0].to_string(), String::new());
    }
    (parts[1..].join(" "), parts[0].to_string())
}

/// 归一化性别字段，兼容导入文件中的多种写法
pub fn normalize_gender(value: &str) -> Option<Gender> {
    let raw = value.trim().to_lowercase();
    if raw.is_empty() {
        return None;
    }
    match raw.as_str() {
        "male" | "erkak" | "m" | "1" => Some(Gender::Male),
        "female" | "ayol" | "f" | "2" => Some(Gender::Female),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  *Person ID "), "person id");
        assert_eq!(normalize_header("First Name"), "first name");
    }

    #[test]
    fn test_build_full_name() {
        assert_eq!(build_full_name("Aliyev", "Bobur"), "Aliyev Bobur");
        assert_eq!(build_full_name("", "Bobur"), "Bobur");
        assert_eq!(build_full_name("  Aliyev  ", ""), "Aliyev");
    }

    #[test]
    fn test_split_full_name() {
        assert_eq!(
            split_full_name("Aliyev Bobur"),
            ("Bobur".to_string(), "Aliyev".to_string())
        );
        assert_eq!(
            split_full_name("Bobur"),
            ("Bobur".to_string(), String::new())
        );
        assert_eq!(
            split_full_name("Aliyev Bobur Olim"),
            ("Bobur Olim".to_string(), "Aliyev".to_string())
        );
        assert_eq!(split_full_name("   "), (String::new(), String::new()));
    }

    #[test]
    fn test_normalize_gender() {
        assert_eq!(normalize_gender("Male"), Some(Gender::Male));
        assert_eq!(normalize_gender("erkak"), Some(Gender::Male));
        assert_eq!(normalize_gender("F"), Some(Gender::Female));
        assert_eq!(normalize_gender("2"), Some(Gender::Female));
        assert_eq!(normalize_gender("unknown"), None);
        assert_eq!(normalize_gender(""), None);
    }
}
