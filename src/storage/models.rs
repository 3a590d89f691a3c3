use chrono::{DateTime, Utc};
use migration::entities::url_mapping;

/// 短 id 到原始 URL 的映射
///
/// `creator_origin` 和 `visit_count` 只用于审计，不会出现在读接口里。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMapping {
    pub id: String,
    pub original_url: String,
    pub visit_count: u64,
    pub creator_origin: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<url_mapping::Model> for UrlMapping {
    fn from(model: url_mapping::Model) -> Self {
        Self {
            id: model.id,
            original_url: model.original_url,
            visit_count: model.visit_count.max(0) as u64,
            creator_origin: model.creator_origin,
            created_at: model.created_at,
        }
    }
}

/// 新建映射的 ActiveModel，计数从 0 开始
pub fn new_active_model(
    id: &str,
    original_url: &str,
    creator_origin: Option<&str>,
) -> url_mapping::ActiveModel {
    use sea_orm::ActiveValue::Set;

    url_mapping::ActiveModel {
        id: Set(id.to_string()),
        original_url: Set(original_url.to_string()),
        visit_count: Set(0),
        creator_origin: Set(creator_origin.map(str::to_string)),
        created_at: Set(Utc::now()),
    }
}
