//! Short-code mapping between QR codes and documents/cases.

use chrono::Utc;
use rand::Rng;
use sea_orm::{ColumnTrait, Condition, DbConn, Set};

use crate::application::error::DatabaseError;
use crate::models::prelude::*;
use crate::models::qr_code::QrResourceType;
use crate::repositories::base::Repository;

// No ambiguous characters (0/O, 1/I/L) since codes end up typed by hand.
const CODE_CHARSET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 10;

fn random_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

#[derive(Clone)]
pub struct QrCodeRepository {
    base: Repository<QrCode>,
}

impl QrCodeRepository {
    pub fn new(db: DbConn) -> Self {
        QrCodeRepository {
            base: Repository::new(db, "qr_code"),
        }
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<qr_code::Model>, DatabaseError> {
        self.base
            .try_find_one(Condition::all().add(qr_code::Column::Code.eq(code)))
            .await
    }

    pub async fn find_for_resource(
        &self,
        resource_type: QrResourceType,
        resource_id: i64,
    ) -> Result<Option<qr_code::Model>, DatabaseError> {
        self.base
            .try_find_one(
                Condition::all()
                    .add(qr_code::Column::ResourceType.eq(resource_type.as_str()))
                    .add(qr_code::Column::ResourceId.eq(resource_id)),
            )
            .await
    }

    /// Idempotent per resource: an existing mapping is returned as-is
    /// rather than minting a second code.
    pub async fn generate(
        &self,
        resource_type: QrResourceType,
        resource_id: i64,
        created_by: i64,
    ) -> Result<qr_code::Model, DatabaseError> {
        if let Some(existing) = self.find_for_resource(resource_type, resource_id).await? {
            return Ok(existing);
        }

        self.base
            .create(qr_code::ActiveModel {
                code: Set(random_code()),
                resource_type: Set(resource_type.as_str().to_string()),
                resource_id: Set(resource_id),
                created_by: Set(created_by),
                created_at: Set(Utc::now()),
                ..Default::default()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_code_shape() {
        let code = random_code();
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(code.bytes().all(|b| CODE_CHARSET.contains(&b)));
    }

    #[test]
    fn test_codes_are_not_constant() {
        let a = random_code();
        let b = random_code();
        let c = random_code();
        assert!(a != b || b != c);
    }
}
