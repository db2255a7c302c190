//! 路径参数提取器
//!
//! 路径中的 id 均为 UUID；格式错误时直接返回 400，不进入业务逻辑。

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use std::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn parse_uuid_param(req: &HttpRequest, name: &str) -> Result<String, actix_web::Error> {
    let raw = req.match_info().get(name).unwrap_or_default();
    match uuid::Uuid::parse_str(raw) {
        Ok(id) => Ok(id.to_string()),
        Err(_) => {
            let response = HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                format!("Invalid {name}: expected a UUID"),
            ));
            Err(InternalError::from_response(format!("invalid {name}"), response).into())
        }
    }
}

macro_rules! uuid_path_extractor {
    ($(#[$meta:meta])* $name:ident, $param:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub String);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                ready(parse_uuid_param(req, $param).map($name))
            }
        }
    };
}

uuid_path_extractor!(
    /// `{classroom_id}`
    SafeClassroomId,
    "classroom_id"
);
uuid_path_extractor!(SafeStudentId, "student_id");
uuid_path_extractor!(SafeBehaviorId, "behavior_id");
uuid_path_extractor!(SafeTransactionId, "transaction_id");
uuid_path_extractor!(SafeBatchId, "batch_id");
uuid_path_extractor!(SafeGroupId, "group_id");
uuid_path_extractor!(SafeSeatId, "seat_id");
uuid_path_extractor!(SafeElementId, "element_id");
uuid_path_extractor!(SafePresetId, "preset_id");

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_valid_uuid_is_normalized() {
        let req = TestRequest::default()
            .param("classroom_id", "5B1F0C7E-3A41-4C2E-9D3A-0F6E1A000001")
            .to_http_request();
        let id = SafeClassroomId::extract(&req).await.unwrap();
        assert_eq!(id.0, "5b1f0c7e-3a41-4c2e-9d3a-0f6e1a000001");
    }

    #[actix_web::test]
    async fn test_invalid_uuid_rejected() {
        let req = TestRequest::default()
            .param("student_id", "42")
            .to_http_request();
        assert!(SafeStudentId::extract(&req).await.is_err());
    }
}
