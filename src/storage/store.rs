//! Mapping store
//!
//! The only component that touches the `urls` table. Every operation takes
//! one slot from the shared [`ConnectionPool`] and releases it on return.

use std::sync::Arc;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ExprTrait, PaginatorTrait, QueryFilter,
    SqlErr, TransactionTrait, sea_query::Expr,
};
use tracing::{debug, error, info, warn};

use super::models::{UrlMapping, new_active_model};
use super::pool::ConnectionPool;
use super::retry::{self, RetryConfig};
use crate::cache::MappingCache;
use crate::errors::{Result, ShortUrlError};
use crate::utils::{IdPolicy, validate_url};

use migration::entities::url_mapping;

pub struct MappingStore {
    pool: Arc<ConnectionPool>,
    cache: Arc<dyn MappingCache>,
    retry_config: RetryConfig,
    id_policy: IdPolicy,
}

impl MappingStore {
    pub fn new(
        pool: Arc<ConnectionPool>,
        cache: Arc<dyn MappingCache>,
        retry_config: RetryConfig,
        id_policy: IdPolicy,
    ) -> Self {
        Self {
            pool,
            cache,
            retry_config,
            id_policy,
        }
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub fn id_policy(&self) -> IdPolicy {
        self.id_policy
    }

    /// 新建映射，计数从 0 开始
    ///
    /// 重复 id 由主键约束判定，并发创建同一个 id 只有一个会成功。
    pub async fn create(
        &self,
        id: &str,
        original_url: &str,
        creator_origin: Option<&str>,
    ) -> Result<()> {
        self.id_policy
            .validate(id)
            .map_err(|e| ShortUrlError::invalid_input(format!("invalid id: {}", e)))?;
        validate_url(original_url)
            .map_err(|e| ShortUrlError::invalid_input(format!("invalid url: {}", e)))?;

        let conn = self.pool.acquire("create")?;
        let db: &sea_orm::DatabaseConnection = &conn;
        let model = new_active_model(id, original_url, creator_origin);

        // 语句发出后的失败无法判断是否已写入，只重试拿连接阶段的失败
        let result = retry::with_retry_if(
            &format!("create({})", id),
            self.retry_config,
            retry::is_acquire_error,
            || {
                let model = model.clone();
                async move {
                    url_mapping::Entity::insert(model)
                        .exec_without_returning(db)
                        .await
                }
            },
        )
        .await;

        match result {
            Ok(_) => {
                info!("Mapping created: {}", id);
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => {
                debug!("Duplicate id rejected: {}", id);
                Err(ShortUrlError::duplicate_id(id))
            }
            Err(e) => {
                error!("Failed to create mapping {}: {}", id, e);
                Err(ShortUrlError::store_unavailable("failed to insert mapping"))
            }
        }
    }

    /// 解析 id 并把访问计数加一
    ///
    /// 计数用单条 `visit_count = visit_count + 1` 语句原子递增，影响行数为 0 即不存在。
    /// 返回值里的计数是递增之后的值。
    pub async fn resolve_and_touch(&self, id: &str) -> Result<UrlMapping> {
        if self.id_policy.validate(id).is_err() {
            return Err(ShortUrlError::not_found(id));
        }

        let conn = self.pool.acquire("resolve")?;
        let db: &sea_orm::DatabaseConnection = &conn;
        let op_name = format!("resolve({})", id);

        if let Some(mut cached) = self.cache.get(id).await {
            let touched = retry::with_retry(&op_name, self.retry_config, || increment(db, id))
                .await
                .map_err(|e| store_error("resolve", id, e))?;

            if !touched {
                // 缓存里有但库里没有，说明库被外部改过
                warn!("Cached mapping {} missing from store, dropping it", id);
                self.cache.remove(id).await;
                return Err(ShortUrlError::not_found(id));
            }
            cached.visit_count += 1;
            return Ok(cached);
        }

        let model = retry::with_retry(&op_name, self.retry_config, || {
            increment_and_read(db, id)
        })
        .await
        .map_err(|e| store_error("resolve", id, e))?;

        match model {
            Some(model) => {
                let mapping = UrlMapping::from(model);
                self.cache.insert(id, mapping.clone()).await;
                Ok(mapping)
            }
            None => Err(ShortUrlError::not_found(id)),
        }
    }

    /// 只读查询，不改计数，不走缓存
    pub async fn peek(&self, id: &str) -> Result<Option<UrlMapping>> {
        if self.id_policy.validate(id).is_err() {
            return Ok(None);
        }

        let conn = self.pool.acquire("peek")?;
        let db: &sea_orm::DatabaseConnection = &conn;

        let model = retry::with_retry(&format!("peek({})", id), self.retry_config, || async {
            url_mapping::Entity::find_by_id(id.to_string()).one(db).await
        })
        .await
        .map_err(|e| store_error("peek", id, e))?;

        Ok(model.map(UrlMapping::from))
    }

    /// 映射总数
    pub async fn count(&self) -> Result<u64> {
        let conn = self.pool.acquire("count")?;
        let db: &sea_orm::DatabaseConnection = &conn;

        retry::with_retry("count", self.retry_config, || async {
            url_mapping::Entity::find().count(db).await
        })
        .await
        .map_err(|e| store_error("count", "*", e))
    }
}

/// 原子递增，返回是否命中
async fn increment<C: ConnectionTrait>(db: &C, id: &str) -> std::result::Result<bool, DbErr> {
    let result = url_mapping::Entity::update_many()
        .col_expr(
            url_mapping::Column::VisitCount,
            Expr::col(url_mapping::Column::VisitCount).add(1i64),
        )
        .filter(url_mapping::Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}

/// 在同一个事务（同一个连接）上递增并读回
async fn increment_and_read(
    db: &sea_orm::DatabaseConnection,
    id: &str,
) -> std::result::Result<Option<url_mapping::Model>, DbErr> {
    let txn = db.begin().await?;

    if !increment(&txn, id).await? {
        txn.rollback().await?;
        return Ok(None);
    }

    let model = url_mapping::Entity::find_by_id(id.to_string())
        .one(&txn)
        .await?;

    txn.commit().await.map_err(|e| match e {
        // 提交途中断线无法判断是否已生效，不能重放
        DbErr::Conn(_) => {
            error!("Commit of visit increment for {} failed: {}", id, e);
            DbErr::Custom("commit outcome unknown".to_string())
        }
        other => other,
    })?;

    Ok(model)
}

fn is_unique_violation(err: &DbErr) -> bool {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }

    // 回退：部分驱动路径不带错误码
    let msg = err.to_string().to_lowercase();
    msg.contains("unique constraint failed")
        || msg.contains("duplicate entry")
        || msg.contains("duplicate key value")
}

fn store_error(operation: &str, id: &str, err: DbErr) -> ShortUrlError {
    error!("Store operation {} failed for {}: {}", operation, id, err);
    ShortUrlError::store_unavailable(format!("{} failed", operation))
}
