use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::{
    db::OrmConn,
    entity::uploaded_files::{Column as FileCol, Entity as UploadedFiles, Model as FileModel},
    models::UploadedFile,
};

pub const LINKED_FILE_CAP: u64 = 10;

/// Linkage tiers, strongest first. Uploads carry no foreign key to orders,
/// so each tier trades some precision for recall; the order-creation cutoff
/// bounds how far a weak tier can reach. Without a cart-id hit, exact
/// provenance is not guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkTier {
    CartLinked,
    UserProduct,
    UserRecent,
}

const TIERS: [LinkTier; 3] = [LinkTier::CartLinked, LinkTier::UserProduct, LinkTier::UserRecent];

/// Best-effort association of uploaded design files with one order line
/// item, newest first, capped. A tier is consulted only when every earlier
/// tier yielded nothing; a tier's query failure counts as an empty tier.
pub async fn link_files(
    orm: &OrmConn,
    user_id: Uuid,
    order_created_at: DateTime<Utc>,
    product_id: Uuid,
    candidate_cart_ids: &[Uuid],
) -> Vec<UploadedFile> {
    for tier in TIERS {
        if tier == LinkTier::CartLinked && candidate_cart_ids.is_empty() {
            continue;
        }
        match query_tier(orm, tier, user_id, product_id, candidate_cart_ids).await {
            Ok(rows) => {
                let files = clamp_to_order_window(rows, order_created_at);
                if !files.is_empty() {
                    return files.into_iter().map(file_from_entity).collect();
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, ?tier, "upload lookup failed, trying next tier");
            }
        }
    }
    Vec::new()
}

async fn query_tier(
    orm: &OrmConn,
    tier: LinkTier,
    user_id: Uuid,
    product_id: Uuid,
    candidate_cart_ids: &[Uuid],
) -> Result<Vec<FileModel>, sea_orm::DbErr> {
    let finder = match tier {
        LinkTier::CartLinked => UploadedFiles::find()
            .filter(FileCol::CartId.is_in(candidate_cart_ids.iter().copied()))
            .filter(FileCol::ProductId.eq(product_id)),
        LinkTier::UserProduct => UploadedFiles::find()
            .filter(FileCol::UserId.eq(user_id))
            .filter(FileCol::ProductId.eq(product_id)),
        LinkTier::UserRecent => UploadedFiles::find().filter(FileCol::UserId.eq(user_id)),
    };
    finder
        .order_by_desc(FileCol::UploadedAt)
        .limit(LINKED_FILE_CAP)
        .all(orm)
        .await
}

/// Uploads after the order was created cannot belong to it.
fn clamp_to_order_window(
    rows: Vec<FileModel>,
    order_created_at: DateTime<Utc>,
) -> Vec<FileModel> {
    rows.into_iter()
        .filter(|row| row.uploaded_at.with_timezone(&Utc) <= order_created_at)
        .collect()
}

fn file_from_entity(model: FileModel) -> UploadedFile {
    UploadedFile {
        id: model.id,
        user_id: model.user_id,
        product_id: model.product_id,
        cart_id: model.cart_id,
        storage_path: model.storage_path,
        file_name: model.file_name,
        mime_type: model.mime_type,
        uploaded_at: model.uploaded_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn file_at(uploaded_at: DateTime<Utc>) -> FileModel {
        FileModel {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            product_id: None,
            cart_id: None,
            storage_path: "u1/design.pdf".into(),
            file_name: "design.pdf".into(),
            mime_type: "application/pdf".into(),
            uploaded_at: uploaded_at.into(),
        }
    }

    #[test]
    fn uploads_after_order_creation_are_dropped() {
        let cutoff = Utc::now();
        let rows = vec![
            file_at(cutoff - Duration::minutes(10)),
            file_at(cutoff + Duration::minutes(10)),
        ];
        let kept = clamp_to_order_window(rows, cutoff);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].uploaded_at.with_timezone(&Utc) <= cutoff);
    }

    #[test]
    fn upload_at_order_creation_is_kept() {
        let cutoff = Utc::now();
        let kept = clamp_to_order_window(vec![file_at(cutoff)], cutoff);
        assert_eq!(kept.len(), 1);
    }
}
