//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_classpoints_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum ClassPointsError {
            $($variant(String),)*
        }

        impl ClassPointsError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(ClassPointsError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(ClassPointsError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(ClassPointsError::$variant(msg) => msg,)*
                }
            }
        }

        paste::paste! {
            impl ClassPointsError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        ClassPointsError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_classpoints_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    Io("E006", "IO Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    Conflict("E010", "Conflict"),
    DateParse("E011", "Date Parse Error"),
    Authentication("E012", "Authentication Error"),
    Authorization("E013", "Authorization Error"),
    Network("E014", "Network Error"),
    AudioEncoding("E015", "Audio Encoding Error"),
    Migration("E016", "Legacy Migration Error"),
}

impl ClassPointsError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ClassPointsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ClassPointsError {}

impl From<sea_orm::DbErr> for ClassPointsError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_) => {
                ClassPointsError::DatabaseConnection(err.to_string())
            }
            other => ClassPointsError::DatabaseOperation(other.to_string()),
        }
    }
}

impl From<sea_orm::TransactionError<sea_orm::DbErr>> for ClassPointsError {
    fn from(err: sea_orm::TransactionError<sea_orm::DbErr>) -> Self {
        match err {
            sea_orm::TransactionError::Connection(e) => e.into(),
            sea_orm::TransactionError::Transaction(e) => e.into(),
        }
    }
}

impl From<std::io::Error> for ClassPointsError {
    fn from(err: std::io::Error) -> Self {
        ClassPointsError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ClassPointsError {
    fn from(err: serde_json::Error) -> Self {
        ClassPointsError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for ClassPointsError {
    fn from(err: chrono::ParseError) -> Self {
        ClassPointsError::DateParse(err.to_string())
    }
}

impl From<reqwest::Error> for ClassPointsError {
    fn from(err: reqwest::Error) -> Self {
        ClassPointsError::Network(err.to_string())
    }
}

impl From<hound::Error> for ClassPointsError {
    fn from(err: hound::Error) -> Self {
        ClassPointsError::AudioEncoding(err.to_string())
    }
}

impl From<csv::Error> for ClassPointsError {
    fn from(err: csv::Error) -> Self {
        ClassPointsError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClassPointsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ClassPointsError::cache_connection("test").code(), "E001");
        assert_eq!(ClassPointsError::database_config("test").code(), "E003");
        assert_eq!(ClassPointsError::validation("test").code(), "E007");
        assert_eq!(ClassPointsError::authentication("test").code(), "E012");
        assert_eq!(ClassPointsError::audio_encoding("test").code(), "E015");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            ClassPointsError::conflict("test").error_type(),
            "Conflict"
        );
        assert_eq!(
            ClassPointsError::migration("test").error_type(),
            "Legacy Migration Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = ClassPointsError::validation("Invalid input");
        assert_eq!(err.message(), "Invalid input");
    }

    #[test]
    fn test_from_serde_json() {
        let err: ClassPointsError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), "E009");
    }

    #[test]
    fn test_format_simple() {
        let err = ClassPointsError::network("HEAD request timed out");
        let formatted = err.format_simple();
        assert!(formatted.contains("Network Error"));
        assert!(formatted.contains("HEAD request timed out"));
    }
}
