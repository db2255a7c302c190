pub mod create;
pub mod delete;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::middlewares::RequireJWT;
use crate::models::behaviors::entities::Behavior;
use crate::models::behaviors::requests::{CreateBehaviorRequest, UpdateBehaviorRequest};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct BehaviorService {
    storage: Option<Arc<dyn Storage>>,
}

impl BehaviorService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 全局行为加自己的自定义行为，按正负分组
    pub async fn list_behaviors(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_behaviors(self, request).await
    }

    pub async fn create_behavior(
        &self,
        request: &HttpRequest,
        body: CreateBehaviorRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_behavior(self, request, body).await
    }

    pub async fn update_behavior(
        &self,
        request: &HttpRequest,
        behavior_id: String,
        body: UpdateBehaviorRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_behavior(self, request, behavior_id, body).await
    }

    pub async fn delete_behavior(
        &self,
        request: &HttpRequest,
        behavior_id: String,
    ) -> ActixResult<HttpResponse> {
        delete::delete_behavior(self, request, behavior_id).await
    }
}

/// 自定义行为只能由创建者修改；全局行为仅管理员可改
pub(crate) fn can_modify(user: &User, behavior: &Behavior) -> bool {
    match behavior.user_id.as_deref() {
        Some(owner) => owner == user.id || user.is_admin(),
        None => user.is_admin(),
    }
}

/// 加载行为并做修改权限校验
pub(crate) async fn load_modifiable(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    behavior_id: &str,
) -> Result<(User, Behavior), HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Err(crate::services::unauthorized());
    };
    let behavior = match storage.get_behavior(behavior_id).await {
        Ok(Some(behavior)) => behavior,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::BehaviorNotFound,
                "Behavior not found",
            )));
        }
        Err(e) => {
            return Err(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to get behavior: {e}"),
                )),
            );
        }
    };
    if !can_modify(&user, &behavior) {
        return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::BehaviorPermissionDenied,
            "No permission to modify this behavior",
        )));
    }
    Ok((user, behavior))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::behaviors::entities::BehaviorCategory;
    use crate::models::users::entities::{UserRole, UserStatus};

    fn user(id: &str, role: UserRole) -> User {
        User {
            id: id.to_string(),
            username: id.to_string(),
            email: format!("{id}@example.com"),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            display_name: None,
            last_login: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn behavior(owner: Option<&str>) -> Behavior {
        Behavior {
            id: "b1".to_string(),
            user_id: owner.map(str::to_string),
            name: "Helping".to_string(),
            points: 2,
            icon: "🤝".to_string(),
            category: BehaviorCategory::Positive,
            is_custom: owner.is_some(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_modify_permissions() {
        let teacher = user("t1", UserRole::Teacher);
        let admin = user("root", UserRole::Admin);

        assert!(can_modify(&teacher, &behavior(Some("t1"))));
        assert!(!can_modify(&teacher, &behavior(Some("t2"))));
        assert!(!can_modify(&teacher, &behavior(None)));
        assert!(can_modify(&admin, &behavior(None)));
        assert!(can_modify(&admin, &behavior(Some("t2"))));
    }
}
