use std::collections::BTreeSet;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    error::{AppError, AppResult},
    models::{CartLine, CartVariantAssignment},
    selection::VariantSelectionModel,
    state::AppState,
};

/// Merge a configured selection into the user's cart, or create a new line.
///
/// A candidate line merges only when its variant assignments are exactly the
/// selection's signature, as a set: same size, same membership, order
/// irrelevant. A line with extra or missing variants never merges.
pub async fn add_to_cart(
    state: &AppState,
    user_id: Uuid,
    selection: &VariantSelectionModel,
) -> AppResult<CartLine> {
    let product_id = selection.product_id();
    let product_exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&state.pool)
        .await?;
    if product_exists.is_none() {
        return Err(AppError::NotFound);
    }

    let candidates: Vec<CartLine> =
        sqlx::query_as("SELECT * FROM cart WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .fetch_all(&state.pool)
            .await?;

    let wanted = selection.signature();

    for candidate in candidates {
        let assigned: Vec<CartVariantAssignment> =
            sqlx::query_as("SELECT * FROM cart_variants WHERE cart_id = $1")
                .bind(candidate.id)
                .fetch_all(&state.pool)
                .await?;

        if signatures_match(&wanted, assigned.into_iter().map(|row| row.variant_value_id)) {
            return merge_into_line(state, user_id, &candidate, selection).await;
        }
    }

    create_line_with_assignments(state, user_id, selection).await
}

pub async fn remove_from_cart(state: &AppState, user_id: Uuid, cart_id: Uuid) -> AppResult<()> {
    // Assignments go with the line (ON DELETE CASCADE).
    let result = sqlx::query("DELETE FROM cart WHERE id = $1 AND user_id = $2")
        .bind(cart_id)
        .bind(user_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user_id),
        "cart_remove",
        Some("cart"),
        Some(serde_json::json!({ "cart_id": cart_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(())
}

async fn merge_into_line(
    state: &AppState,
    user_id: Uuid,
    line: &CartLine,
    selection: &VariantSelectionModel,
) -> AppResult<CartLine> {
    let quantity = line.quantity + selection.quantity();
    // Unit price comes from the live selection, not the stored line, so
    // variant price changes are picked up on merge.
    let unit_price = selection.unit_price();
    let total = (unit_price * Decimal::from(quantity)).round_dp(2);

    let updated: CartLine = sqlx::query_as(
        r#"
        UPDATE cart
        SET quantity = $3, unit_price = $4, total = $5, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(line.id)
    .bind(user_id)
    .bind(quantity)
    .bind(unit_price)
    .bind(total)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user_id),
        "cart_merge",
        Some("cart"),
        Some(serde_json::json!({ "cart_id": updated.id, "quantity": updated.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(updated)
}

// Two-phase create. The backend offers no multi-row transaction, so a failed
// assignment insert undoes the fresh line with a compensating delete before
// the error propagates. A crash between the two phases can still leave an
// empty line behind; its empty assignment set only ever matches another
// empty selection, so later merges are unaffected.
async fn create_line_with_assignments(
    state: &AppState,
    user_id: Uuid,
    selection: &VariantSelectionModel,
) -> AppResult<CartLine> {
    let line: CartLine = sqlx::query_as(
        r#"
        INSERT INTO cart (id, user_id, product_id, quantity, unit_price, total, variant_signature)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(selection.product_id())
    .bind(selection.quantity())
    .bind(selection.unit_price())
    .bind(selection.total())
    .bind(selection.signature_key())
    .fetch_one(&state.pool)
    .await
    .map_err(map_line_insert_err)?;

    for value in selection.selected_values() {
        let inserted = sqlx::query(
            "INSERT INTO cart_variants (id, cart_id, variant_value_id, price_delta) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(line.id)
        .bind(value.id)
        .bind(value.price_delta)
        .execute(&state.pool)
        .await;

        if let Err(err) = inserted {
            undo_line(state, line.id).await;
            return Err(err.into());
        }
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user_id),
        "cart_create",
        Some("cart"),
        Some(serde_json::json!({ "cart_id": line.id, "product_id": line.product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(line)
}

async fn undo_line(state: &AppState, cart_id: Uuid) {
    if let Err(err) = sqlx::query("DELETE FROM cart WHERE id = $1")
        .bind(cart_id)
        .execute(&state.pool)
        .await
    {
        tracing::warn!(error = %err, cart_id = %cart_id, "compensating cart line delete failed");
    }
}

fn map_line_insert_err(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateVariantSet,
        _ => AppError::DbError(err),
    }
}

fn signatures_match(wanted: &BTreeSet<Uuid>, assigned: impl IntoIterator<Item = Uuid>) -> bool {
    let assigned: Vec<Uuid> = assigned.into_iter().collect();
    if assigned.len() != wanted.len() {
        return false;
    }
    let assigned: BTreeSet<Uuid> = assigned.into_iter().collect();
    assigned == *wanted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_sets_match_regardless_of_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let wanted: BTreeSet<Uuid> = [a, b].into_iter().collect();
        assert!(signatures_match(&wanted, [b, a]));
        assert!(signatures_match(&wanted, [a, b]));
    }

    #[test]
    fn subset_never_matches() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let wanted: BTreeSet<Uuid> = [a, b].into_iter().collect();
        assert!(!signatures_match(&wanted, [a]));

        let smaller: BTreeSet<Uuid> = [a].into_iter().collect();
        assert!(!signatures_match(&smaller, [a, b]));
    }

    #[test]
    fn differing_membership_never_matches() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let wanted: BTreeSet<Uuid> = [a, b].into_iter().collect();
        assert!(!signatures_match(&wanted, [a, c]));
    }

    #[test]
    fn duplicate_assignments_do_not_fake_a_match() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let wanted: BTreeSet<Uuid> = [a, b].into_iter().collect();
        assert!(!signatures_match(&wanted, [a, a]));
    }

    #[test]
    fn empty_matches_only_empty() {
        let empty = BTreeSet::new();
        assert!(signatures_match(&empty, []));
        assert!(!signatures_match(&empty, [Uuid::new_v4()]));
    }
}
