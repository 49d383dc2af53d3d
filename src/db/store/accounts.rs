use sqlx::SqlitePool;

use crate::db::models::DbAccount;
use crate::db::page::{Page, PageRequest};
use crate::db::patch::{AccountPatch, NewAccount};
use crate::db::query::{self, Filter};
use crate::error::EmporiumError;

/// Storefront users and back-office admins share one row shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    User,
    Admin,
}

impl AccountKind {
    pub(crate) fn table(self) -> &'static str {
        match self {
            AccountKind::User => "users",
            AccountKind::Admin => "admins",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccountRepo {
    pool: SqlitePool,
    kind: AccountKind,
}

impl AccountRepo {
    pub fn new(pool: SqlitePool, kind: AccountKind) -> Self {
        Self { pool, kind }
    }

    pub async fn create(&self, new: NewAccount) -> Result<DbAccount, EmporiumError> {
        let sql = format!(
            r#"
            INSERT INTO {} (name, email, phone, password, image, image_public_id)
            VALUES (?, ?, ?, ?, ?, '')
            RETURNING *
            "#,
            self.kind.table()
        );
        let row = sqlx::query_as::<_, DbAccount>(&sql)
            .bind(new.name)
            .bind(new.email)
            .bind(new.phone)
            .bind(new.password_hash)
            .bind(new.image)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<DbAccount>, EmporiumError> {
        let sql = format!("SELECT * FROM {} WHERE email = ?", self.kind.table());
        Ok(sqlx::query_as::<_, DbAccount>(&sql)
            .bind(email.to_string())
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Whether another account already uses `email` or `phone`.
    pub async fn is_taken(&self, email: &str, phone: Option<&str>) -> Result<bool, EmporiumError> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE email = ? OR (? IS NOT NULL AND phone = ?))",
            self.kind.table()
        );
        let phone = phone.map(str::to_string);
        Ok(sqlx::query_scalar::<_, bool>(&sql)
            .bind(email.to_string())
            .bind(phone.clone())
            .bind(phone)
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn list(&self, req: PageRequest) -> Result<Page<DbAccount>, EmporiumError> {
        query::fetch_page(&self.pool, self.kind.table(), &Filter::new(), req).await
    }

    pub async fn count(&self) -> Result<i64, EmporiumError> {
        query::count(&self.pool, self.kind.table(), &Filter::new()).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<DbAccount>, EmporiumError> {
        query::fetch_by_id(&self.pool, self.kind.table(), id).await
    }

    pub async fn update(
        &self,
        id: i64,
        patch: &AccountPatch,
    ) -> Result<Option<DbAccount>, EmporiumError> {
        query::patch_and_fetch(&self.pool, self.kind.table(), id, patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, EmporiumError> {
        Ok(query::delete_by_id(&self.pool, self.kind.table(), id).await? > 0)
    }
}
