//! 输入校验
//!
//! 账号字段沿用常规策略；名称类字段统一去除首尾空白后限制长度。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::behaviors::entities::BehaviorCategory;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Invalid color regex"));

/// 名称最大字符数
pub const MAX_NAME_CHARS: usize = 100;

/// 单个行为的分值上限（绝对值）
pub const MAX_BEHAVIOR_POINTS: i32 = 100;

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    // 用户名长度：5 <= x <= 16
    if username.len() < 5 || username.len() > 16 {
        return Err("Username length must be between 5 and 16 characters");
    }
    if !USERNAME_RE.is_match(username) {
        return Err("Username must contain only letters, numbers, underscores or hyphens");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 密码策略：至少 8 个字符，包含大写、小写字母和数字，且不是常见弱密码
pub fn validate_password(password: &str) -> Result<(), String> {
    const WEAK: [&str; 6] = [
        "password1",
        "12345678",
        "qwerty123",
        "admin123",
        "abcd1234",
        "classroom1",
    ];

    let mut errors = Vec::new();
    if password.chars().count() < 8 {
        errors.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }
    if WEAK.iter().any(|weak| password.eq_ignore_ascii_case(weak)) {
        errors.push("Password is too common, please choose a stronger password");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

/// 校验并规范化名称（班级、学生、行为、预设）
pub fn normalize_name(raw: &str, field: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(format!(
            "{field} must be at most {MAX_NAME_CHARS} characters"
        ));
    }
    Ok(name.to_string())
}

pub fn validate_avatar_color(color: &str) -> Result<(), &'static str> {
    if color.is_empty() || HEX_COLOR_RE.is_match(color) {
        Ok(())
    } else {
        Err("Avatar color must be a #RRGGBB hex value")
    }
}

/// 行为分值非零，且与类别符号一致
pub fn validate_behavior_points(
    points: i32,
    category: Option<BehaviorCategory>,
) -> Result<BehaviorCategory, String> {
    if points == 0 {
        return Err("Behavior points must not be zero".to_string());
    }
    if points.abs() > MAX_BEHAVIOR_POINTS {
        return Err(format!(
            "Behavior points must be between -{MAX_BEHAVIOR_POINTS} and {MAX_BEHAVIOR_POINTS}"
        ));
    }
    let implied = BehaviorCategory::for_points(points);
    match category {
        Some(category) if category != implied => Err(format!(
            "Category '{category}' does not match the sign of {points} points"
        )),
        _ => Ok(implied),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        assert!(validate_password("SecureP@ss1").is_ok());
        assert!(validate_password("SecurePass123").is_ok());
    }

    #[test]
    fn test_password_errors_are_joined() {
        let err = validate_password("abc").unwrap_err();
        assert!(err.contains("at least 8 characters"));
        assert!(err.contains("uppercase"));
        assert!(err.contains("digit"));
    }

    #[test]
    fn test_common_password() {
        let err = validate_password("Password1").unwrap_err();
        assert!(err.contains("too common"));
    }

    #[test]
    fn test_username_and_email() {
        assert!(validate_username("msfrizzle").is_ok());
        assert!(validate_username("abc").is_err());
        assert!(validate_username("bad name!").is_err());
        assert!(validate_email("teacher@school.org").is_ok());
        assert!(validate_email("teacher@school").is_err());
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Room 4B ", "Name").unwrap(), "Room 4B");
        assert!(normalize_name("   ", "Name").is_err());
        assert!(normalize_name(&"x".repeat(101), "Name").is_err());
    }

    #[test]
    fn test_avatar_color() {
        assert!(validate_avatar_color("#1a2B3c").is_ok());
        assert!(validate_avatar_color("").is_ok());
        assert!(validate_avatar_color("red").is_err());
    }

    #[test]
    fn test_behavior_points_sign_must_match_category() {
        assert_eq!(
            validate_behavior_points(3, None).unwrap(),
            BehaviorCategory::Positive
        );
        assert_eq!(
            validate_behavior_points(-2, Some(BehaviorCategory::Negative)).unwrap(),
            BehaviorCategory::Negative
        );
        assert!(validate_behavior_points(2, Some(BehaviorCategory::Negative)).is_err());
        assert!(validate_behavior_points(0, None).is_err());
        assert!(validate_behavior_points(500, None).is_err());
    }
}
