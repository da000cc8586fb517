//! 日志脱敏
//! 将 `key=value` 形式日志中的敏感字段替换为固定标记

use once_cell::sync::Lazy;
use regex::Regex;

/// 默认敏感字段
pub const PII_FIELDS: [&str; 5] = ["name", "email", "phone", "ssn", "password"];

pub const REDACTION: &str = "***";

pub const SEPARATOR: char = ';';

static PII_PATTERN: Lazy<Regex> = Lazy::new(|| field_pattern(&PII_FIELDS, SEPARATOR));

fn field_pattern(fields: &[&str], separator: char) -> Regex {
    let names = fields
        .iter()
        .map(|f| regex::escape(f))
        .collect::<Vec<_>>()
        .join("|");
    let separator = regex::escape(&separator.to_string());
    Regex::new(&format!(r"\b({})=[^{}]*", names, separator))
        .expect("escaped field names always form a valid pattern")
}

/// 对 `message` 中的 `fields` 字段值进行脱敏
pub fn filter_datum(fields: &[&str], redaction: &str, message: &str, separator: char) -> String {
    if fields.is_empty() {
        return message.to_string();
    }
    let pattern = field_pattern(fields, separator);
    replace(&pattern, redaction, message)
}

/// 使用默认字段、标记和分隔符脱敏
pub fn redact_pii(message: &str) -> String {
    replace(&PII_PATTERN, REDACTION, message)
}

fn replace(pattern: &Regex, redaction: &str, message: &str) -> String {
    pattern
        .replace_all(message, |caps: &regex::Captures| {
            format!("{}={}", &caps[1], redaction)
        })
        .into_owned()
}
