use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "behavior.ts")]
pub enum BehaviorCategory {
    Positive,
    Negative,
}

impl BehaviorCategory {
    pub fn for_points(points: i32) -> Self {
        if points < 0 {
            BehaviorCategory::Negative
        } else {
            BehaviorCategory::Positive
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorCategory::Positive => "positive",
            BehaviorCategory::Negative => "negative",
        }
    }
}

impl std::fmt::Display for BehaviorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BehaviorCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(BehaviorCategory::Positive),
            "negative" => Ok(BehaviorCategory::Negative),
            _ => Err(format!("Invalid behavior category: {s}")),
        }
    }
}

// 行为；user_id 为空表示全局目录中的行为
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "behavior.ts")]
pub struct Behavior {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub points: i32,
    pub icon: String,
    pub category: BehaviorCategory,
    pub is_custom: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Behavior {
    /// 用户可见：全局行为或自己的自定义行为
    pub fn visible_to(&self, user_id: &str) -> bool {
        self.user_id.as_deref().is_none_or(|owner| owner == user_id)
    }
}
