//! # Employee Repository
//!
//! Database operations for employees.
//!
//! ## Password Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CreateEmployee.password ──► argon2 (random salt) ──► password_hash     │
//! │                                                                         │
//! │  SELECT never returns password_hash: Employee has no such field.       │
//! │  verify_password() is the only reader of the column.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{push_contains, push_page, search_text};
use crate::error::{DbError, DbResult};
use market_core::requests::{CreateEmployee, EmployeeFilter, UpdateEmployee};
use market_core::{Employee, ListPage};

const SELECT_EMPLOYEE: &str = "SELECT id, first_name, last_name, phone, login, branch_id, \
     salepoint_id, user_type, created_at, updated_at FROM employees";

/// Repository for employee database operations.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    /// Creates a new EmployeeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    /// Creates an employee, storing only the hash of the password.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` when the login is taken.
    pub async fn create(&self, req: &CreateEmployee) -> DbResult<Employee> {
        let now = Utc::now();
        let employee = Employee {
            id: Uuid::new_v4().to_string(),
            first_name: req.first_name.clone(),
            last_name: req.last_name.clone(),
            phone: req.phone.clone(),
            login: req.login.clone(),
            branch_id: req.branch_id.clone(),
            salepoint_id: req.salepoint_id.clone(),
            user_type: req.user_type,
            created_at: now,
            updated_at: now,
        };
        let password_hash = hash_password(&req.password)?;
        let search = search_text(&[&employee.first_name, &employee.last_name, &employee.phone]);

        debug!(id = %employee.id, login = %employee.login, "Creating employee");

        sqlx::query(
            r#"
            INSERT INTO employees (
                id, first_name, last_name, phone, login, password_hash,
                branch_id, salepoint_id, user_type, created_at, updated_at, search_text
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&employee.id)
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.phone)
        .bind(&employee.login)
        .bind(&password_hash)
        .bind(&employee.branch_id)
        .bind(&employee.salepoint_id)
        .bind(employee.user_type)
        .bind(employee.created_at)
        .bind(employee.updated_at)
        .bind(&search)
        .execute(&self.pool)
        .await
        .map_err(|e| login_taken(e, &employee.login))?;

        Ok(employee)
    }

    /// Gets an employee by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Employee>> {
        let sql = format!("{SELECT_EMPLOYEE} WHERE id = ?1");
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(employee)
    }

    /// Lists employees, newest first.
    ///
    /// A non-empty `search` matches first name, last name or phone as a
    /// case-insensitive substring, Cyrillic included.
    pub async fn get_list(&self, filter: &EmployeeFilter) -> DbResult<ListPage<Employee>> {
        let mut conn = self.pool.acquire().await?;

        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM employees WHERE 1 = 1");
        push_contains(&mut count_query, "search_text", &filter.search);
        let count = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await?;

        let mut list_query = QueryBuilder::<Sqlite>::new(format!("{SELECT_EMPLOYEE} WHERE 1 = 1"));
        push_contains(&mut list_query, "search_text", &filter.search);
        push_page(&mut list_query, &filter.page);
        let items = list_query
            .build_query_as::<Employee>()
            .fetch_all(&mut *conn)
            .await?;

        debug!(count, search = %filter.search, "Listed employees");
        Ok(ListPage { count, items })
    }

    /// Replaces the employee's fields. Returns rows affected.
    ///
    /// The stored hash is replaced only when a new password is given.
    pub async fn update(&self, id: &str, req: &UpdateEmployee) -> DbResult<u64> {
        debug!(id = %id, "Updating employee");

        let password_hash = req.password.as_deref().map(hash_password).transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE employees SET
                first_name = ?2,
                last_name = ?3,
                phone = ?4,
                login = ?5,
                password_hash = COALESCE(?6, password_hash),
                branch_id = ?7,
                salepoint_id = ?8,
                user_type = ?9,
                updated_at = ?10,
                search_text = ?11
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.phone)
        .bind(&req.login)
        .bind(password_hash)
        .bind(&req.branch_id)
        .bind(&req.salepoint_id)
        .bind(req.user_type)
        .bind(Utc::now())
        .bind(search_text(&[&req.first_name, &req.last_name, &req.phone]))
        .execute(&self.pool)
        .await
        .map_err(|e| login_taken(e, &req.login))?;

        Ok(result.rows_affected())
    }

    /// Deletes an employee. Returns rows affected.
    pub async fn delete(&self, id: &str) -> DbResult<u64> {
        debug!(id = %id, "Deleting employee");

        let result = sqlx::query("DELETE FROM employees WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Checks a password against the stored hash.
    ///
    /// Unknown employees and malformed hashes both verify as `false`.
    pub async fn verify_password(&self, id: &str, password: &str) -> DbResult<bool> {
        let hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM employees WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(hash.is_some_and(|hash| verify_hash(password, &hash)))
    }
}

/// Names the offending login in unique failures.
fn login_taken(err: sqlx::Error, login: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, login),
        other => other,
    }
}

/// Hashes a password for storage.
fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}

fn verify_hash(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use market_core::{Page, UserType};

    fn employee_payload(login: &str, first_name: &str, phone: &str) -> CreateEmployee {
        CreateEmployee {
            first_name: first_name.to_string(),
            last_name: "Tursunov".to_string(),
            phone: phone.to_string(),
            login: login.to_string(),
            password: "s3cret".to_string(),
            branch_id: None,
            salepoint_id: None,
            user_type: UserType::Cashier,
        }
    }

    fn update_payload(password: Option<&str>) -> UpdateEmployee {
        UpdateEmployee {
            first_name: "Bekzod".to_string(),
            last_name: "Tursunov".to_string(),
            phone: "+998907777777".to_string(),
            login: "bekzod".to_string(),
            password: password.map(str::to_string),
            branch_id: None,
            salepoint_id: None,
            user_type: UserType::Manager,
        }
    }

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_employee() {
        let db = setup().await;
        let repo = db.employees();

        let created = repo
            .create(&employee_payload("bekzod", "Bekzod", "+998901112233"))
            .await
            .unwrap();
        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(fetched.login, "bekzod");
        assert_eq!(fetched.user_type, UserType::Cashier);
        assert_eq!(fetched.full_name(), "Bekzod Tursunov");
    }

    #[tokio::test]
    async fn test_password_is_hashed() {
        let db = setup().await;
        let repo = db.employees();
        let created = repo
            .create(&employee_payload("bekzod", "Bekzod", "+998901112233"))
            .await
            .unwrap();

        let stored: String = sqlx::query_scalar("SELECT password_hash FROM employees WHERE id = ?1")
            .bind(&created.id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_ne!(stored, "s3cret");
        assert!(stored.starts_with("$argon2"));

        assert!(repo.verify_password(&created.id, "s3cret").await.unwrap());
        assert!(!repo.verify_password(&created.id, "wrong").await.unwrap());
        assert!(!repo.verify_password("missing", "s3cret").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_login_rejected() {
        let db = setup().await;
        let repo = db.employees();
        repo.create(&employee_payload("bekzod", "Bekzod", "+998901112233"))
            .await
            .unwrap();

        let err = repo
            .create(&employee_payload("bekzod", "Other", "+998900000000"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_search_and_pagination() {
        let db = setup().await;
        let repo = db.employees();
        repo.create(&employee_payload("a", "Anvar", "+998901000001"))
            .await
            .unwrap();
        repo.create(&employee_payload("b", "Botir", "+998901000002"))
            .await
            .unwrap();
        repo.create(&employee_payload("c", "Anora", "+998935550003"))
            .await
            .unwrap();

        let by_name = repo
            .get_list(&EmployeeFilter {
                search: "ANO".to_string(),
                ..EmployeeFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_name.count, 1);
        assert_eq!(by_name.items[0].first_name, "Anora");

        let by_phone = repo
            .get_list(&EmployeeFilter {
                search: "99890100".to_string(),
                ..EmployeeFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_phone.count, 2);

        let page = repo
            .get_list(&EmployeeFilter {
                page: Page::new(1, 1),
                search: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(page.count, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].first_name, "Botir");
    }

    #[tokio::test]
    async fn test_search_folds_cyrillic_case() {
        let db = setup().await;
        let repo = db.employees();
        let mut aziz = employee_payload("aziz", "Азиз", "+998901000001");
        aziz.last_name = "Каримов".to_string();
        repo.create(&aziz).await.unwrap();
        repo.create(&employee_payload("b", "Botir", "+998901000002"))
            .await
            .unwrap();

        let search = |term: &str| EmployeeFilter {
            search: term.to_string(),
            ..EmployeeFilter::default()
        };

        let lower = repo.get_list(&search("азиз")).await.unwrap();
        assert_eq!(lower.count, 1);
        assert_eq!(lower.items[0].first_name, "Азиз");

        assert_eq!(repo.get_list(&search("КАРИМ")).await.unwrap().count, 1);

        // Wildcards are literal
        assert_eq!(repo.get_list(&search("_")).await.unwrap().count, 0);
        assert_eq!(repo.get_list(&search("%")).await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_update_refreshes_search_text() {
        let db = setup().await;
        let repo = db.employees();
        let created = repo
            .create(&employee_payload("bekzod", "Азиз", "+998901112233"))
            .await
            .unwrap();
        repo.update(&created.id, &update_payload(None)).await.unwrap();

        let filter = |term: &str| EmployeeFilter {
            search: term.to_string(),
            ..EmployeeFilter::default()
        };
        assert_eq!(repo.get_list(&filter("азиз")).await.unwrap().count, 0);
        assert_eq!(repo.get_list(&filter("bekzod")).await.unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_update_keeps_password_when_omitted() {
        let db = setup().await;
        let repo = db.employees();
        let created = repo
            .create(&employee_payload("bekzod", "Bekzod", "+998901112233"))
            .await
            .unwrap();

        assert_eq!(repo.update(&created.id, &update_payload(None)).await.unwrap(), 1);
        let updated = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(updated.user_type, UserType::Manager);
        assert_eq!(updated.phone, "+998907777777");
        assert!(repo.verify_password(&created.id, "s3cret").await.unwrap());

        repo.update(&created.id, &update_payload(Some("n3w")))
            .await
            .unwrap();
        assert!(repo.verify_password(&created.id, "n3w").await.unwrap());

        assert_eq!(repo.update("missing", &update_payload(None)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_employee() {
        let db = setup().await;
        let repo = db.employees();
        let created = repo
            .create(&employee_payload("bekzod", "Bekzod", "+998901112233"))
            .await
            .unwrap();

        assert_eq!(repo.delete(&created.id).await.unwrap(), 1);
        assert!(repo.get_by_id(&created.id).await.unwrap().is_none());
        assert_eq!(repo.delete(&created.id).await.unwrap(), 0);
    }
}
