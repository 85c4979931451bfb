use crate::db::sqlite::{NavStore, SqlitePool};
use crate::error::WaypostError;
use crate::types::requests::OrderUpdate;

/// Rewrite `order_num` for a batch of groups. All-or-nothing: one
/// transaction covers the whole batch. An empty batch never opens one.
pub async fn apply_group_orders(
    store: &NavStore,
    updates: &[OrderUpdate],
) -> Result<(), WaypostError> {
    apply_orders(store.pool(), "groups", updates).await
}

/// Rewrite `order_num` for a batch of sites.
pub async fn apply_site_orders(
    store: &NavStore,
    updates: &[OrderUpdate],
) -> Result<(), WaypostError> {
    apply_orders(store.pool(), "sites", updates).await
}

async fn apply_orders(
    pool: &SqlitePool,
    table: &'static str,
    updates: &[OrderUpdate],
) -> Result<(), WaypostError> {
    if updates.is_empty() {
        return Ok(());
    }
    let sql =
        format!("UPDATE {table} SET order_num = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?");
    let mut tx = pool.begin().await?;
    for update in updates {
        sqlx::query(&sql)
            .bind(update.order_num)
            .bind(update.id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}
