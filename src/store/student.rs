//! Student registry: rows keyed by `(class_name, roll)`.
//!
//! Nothing stops two students sharing a class and roll; lookups resolve to
//! the earliest one.

use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::error::{AppError, AppResult};
use crate::model::student::{NewStudent, Student, StudentPatch, StudentRow};
use crate::utils::db_utils::{SqlValue, build_update_sql, encode_blob, execute_update};

const COLUMNS: &str = "id, name, father, class_name, roll, previous_due, advance, months";

const FIRST_MATCH: &str =
    "SELECT id FROM student WHERE class_name = ? AND roll = ? ORDER BY id LIMIT 1";

/// Counts from a cascading delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removed {
    pub students: u64,
    pub receipts: u64,
}

pub struct StudentRegistry;

impl StudentRegistry {
    #[instrument(skip(pool, input), fields(class_name = %input.class_name, roll = %input.roll))]
    pub async fn add(pool: &SqlitePool, input: &NewStudent) -> AppResult<Student> {
        let query = format!(
            "INSERT INTO student
                (name, father, class_name, roll, previous_due, advance, months)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, StudentRow>(&query)
            .bind(&input.name)
            .bind(&input.father)
            .bind(&input.class_name)
            .bind(&input.roll)
            .bind(input.previous_due)
            .bind(input.advance)
            .bind(encode_blob(&input.months))
            .fetch_one(pool)
            .await?;

        let student = Student::try_from(row)?;
        info!(student_id = student.id, "Student added");
        Ok(student)
    }

    pub async fn get_all(pool: &SqlitePool) -> AppResult<Vec<Student>> {
        let query = format!("SELECT {COLUMNS} FROM student ORDER BY id");
        let rows = sqlx::query_as::<_, StudentRow>(&query)
            .fetch_all(pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(Student::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub async fn get_one(pool: &SqlitePool, class_name: &str, roll: &str) -> AppResult<Student> {
        let query = format!(
            "SELECT {COLUMNS} FROM student
             WHERE class_name = ? AND roll = ?
             ORDER BY id LIMIT 1"
        );
        let row = sqlx::query_as::<_, StudentRow>(&query)
            .bind(class_name)
            .bind(roll)
            .fetch_optional(pool)
            .await?
            .ok_or_else(student_not_found)?;

        Ok(Student::try_from(row)?)
    }

    /// Overwrite only the fields present in `patch`.
    #[instrument(skip(pool, patch))]
    pub async fn update(
        pool: &SqlitePool,
        class_name: &str,
        roll: &str,
        patch: &StudentPatch,
    ) -> AppResult<()> {
        let filter = format!("id = ({FIRST_MATCH})");
        let key = vec![
            SqlValue::Text(class_name.to_string()),
            SqlValue::Text(roll.to_string()),
        ];

        let Some(update) = build_update_sql("student", assignments(patch), &filter, key) else {
            // Nothing to write, but an unknown student is still an error.
            sqlx::query_scalar::<_, i64>(FIRST_MATCH)
                .bind(class_name)
                .bind(roll)
                .fetch_optional(pool)
                .await?
                .ok_or_else(student_not_found)?;
            return Ok(());
        };

        let mut conn = pool.acquire().await?;
        if execute_update(&mut *conn, update).await? == 0 {
            return Err(student_not_found());
        }

        info!("Student updated");
        Ok(())
    }

    /// Remove the student and every receipt linked to it, atomically.
    ///
    /// Both statements are writes, so the transaction takes the write lock up front.
    #[instrument(skip(pool))]
    pub async fn delete_one(pool: &SqlitePool, class_name: &str, roll: &str) -> AppResult<Removed> {
        let mut tx = pool.begin().await?;

        let receipts = sqlx::query(&format!(
            "DELETE FROM receipt WHERE student_id = ({FIRST_MATCH})"
        ))
        .bind(class_name)
        .bind(roll)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let id: i64 = sqlx::query_scalar(&format!(
            "DELETE FROM student WHERE id = ({FIRST_MATCH}) RETURNING id"
        ))
        .bind(class_name)
        .bind(roll)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(student_not_found)?;

        tx.commit().await?;
        info!(student_id = id, receipts, "Student deleted");
        Ok(Removed {
            students: 1,
            receipts,
        })
    }

    /// Remove a whole class along with its students' receipts, atomically.
    #[instrument(skip(pool))]
    pub async fn delete_by_class(pool: &SqlitePool, class_name: &str) -> AppResult<Removed> {
        let mut tx = pool.begin().await?;

        let receipts = sqlx::query(
            "DELETE FROM receipt
             WHERE student_id IN (SELECT id FROM student WHERE class_name = ?)",
        )
        .bind(class_name)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let students = sqlx::query("DELETE FROM student WHERE class_name = ?")
            .bind(class_name)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if students == 0 {
            return Err(AppError::NotFound("No students in this class".to_string()));
        }

        tx.commit().await?;
        info!(students, receipts, "Class deleted");
        Ok(Removed { students, receipts })
    }
}

fn student_not_found() -> AppError {
    AppError::NotFound("Student not found".to_string())
}

fn assignments(patch: &StudentPatch) -> Vec<(&'static str, SqlValue)> {
    let mut set = Vec::new();
    if let Some(name) = &patch.name {
        set.push(("name", SqlValue::Text(name.clone())));
    }
    if let Some(father) = &patch.father {
        set.push(("father", SqlValue::Text(father.clone())));
    }
    if let Some(previous_due) = patch.previous_due {
        set.push(("previous_due", SqlValue::I64(previous_due)));
    }
    if let Some(advance) = patch.advance {
        set.push(("advance", SqlValue::I64(advance)));
    }
    match &patch.months {
        Some(Value::Null) => set.push(("months", SqlValue::Null)),
        Some(months) => set.push(("months", SqlValue::Text(encode_blob(months)))),
        None => {}
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use serde_json::json;

    fn new_student(class_name: &str, roll: &str, name: &str) -> NewStudent {
        NewStudent {
            name: name.to_string(),
            father: format!("{name} Sr."),
            class_name: class_name.to_string(),
            roll: roll.to_string(),
            previous_due: 0,
            advance: 0,
            months: json!({}),
        }
    }

    async fn linked_receipt(pool: &SqlitePool, student_id: i64, key: &str) {
        sqlx::query("INSERT INTO receipt (student_id, receipt_key, months_json) VALUES (?, ?, '[]')")
            .bind(student_id)
            .bind(key)
            .execute(pool)
            .await
            .unwrap();
    }

    async fn count(pool: &SqlitePool, sql: &str) -> i64 {
        sqlx::query_scalar(sql).fetch_one(pool).await.unwrap()
    }

    #[actix_web::test]
    async fn add_then_get_one_returns_full_record() {
        let pool = test_pool().await;
        let mut input = new_student("5th", "12", "Asha");
        input.previous_due = -300;
        input.months = json!({"April": {"paid": 1400}});

        let added = StudentRegistry::add(&pool, &input).await.unwrap();
        let fetched = StudentRegistry::get_one(&pool, "5th", "12").await.unwrap();

        assert_eq!(added, fetched);
        assert_eq!(fetched.previous_due, -300);
        assert_eq!(fetched.months, json!({"April": {"paid": 1400}}));
    }

    #[actix_web::test]
    async fn duplicate_class_and_roll_are_allowed() {
        let pool = test_pool().await;
        let first = StudentRegistry::add(&pool, &new_student("1st", "1", "Ravi"))
            .await
            .unwrap();
        StudentRegistry::add(&pool, &new_student("1st", "1", "Ravi"))
            .await
            .unwrap();

        assert_eq!(StudentRegistry::get_all(&pool).await.unwrap().len(), 2);
        let found = StudentRegistry::get_one(&pool, "1st", "1").await.unwrap();
        assert_eq!(found.id, first.id);
    }

    #[actix_web::test]
    async fn roll_is_scoped_to_class() {
        let pool = test_pool().await;
        StudentRegistry::add(&pool, &new_student("1st", "4", "Ravi"))
            .await
            .unwrap();

        let err = StudentRegistry::get_one(&pool, "2nd", "4").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn update_touches_only_patched_fields() {
        let pool = test_pool().await;
        StudentRegistry::add(&pool, &new_student("3rd", "8", "Meena"))
            .await
            .unwrap();

        let patch = StudentPatch {
            advance: Some(500),
            months: Some(json!({"May": 1300})),
            ..Default::default()
        };
        StudentRegistry::update(&pool, "3rd", "8", &patch).await.unwrap();

        let s = StudentRegistry::get_one(&pool, "3rd", "8").await.unwrap();
        assert_eq!(s.name, "Meena");
        assert_eq!(s.father, "Meena Sr.");
        assert_eq!(s.advance, 500);
        assert_eq!(s.months, json!({"May": 1300}));
    }

    #[actix_web::test]
    async fn null_months_clears_the_column() {
        let pool = test_pool().await;
        let mut input = new_student("3rd", "10", "Nila");
        input.months = json!({"April": 1300});
        StudentRegistry::add(&pool, &input).await.unwrap();

        let patch = StudentPatch {
            months: Some(Value::Null),
            ..Default::default()
        };
        StudentRegistry::update(&pool, "3rd", "10", &patch).await.unwrap();

        let s = StudentRegistry::get_one(&pool, "3rd", "10").await.unwrap();
        assert_eq!(s.months, Value::Null);
        assert_eq!(s.name, "Nila");
        assert_eq!(
            count(&pool, "SELECT COUNT(*) FROM student WHERE months IS NULL").await,
            1
        );
    }

    #[actix_web::test]
    async fn update_acts_on_earliest_duplicate() {
        let pool = test_pool().await;
        let first = StudentRegistry::add(&pool, &new_student("2nd", "5", "Om"))
            .await
            .unwrap();
        let second = StudentRegistry::add(&pool, &new_student("2nd", "5", "Om"))
            .await
            .unwrap();

        let patch = StudentPatch {
            advance: Some(70),
            ..Default::default()
        };
        StudentRegistry::update(&pool, "2nd", "5", &patch).await.unwrap();

        let advances: Vec<(i64, i64)> =
            sqlx::query_as("SELECT id, advance FROM student ORDER BY id")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(advances, vec![(first.id, 70), (second.id, 0)]);
    }

    #[actix_web::test]
    async fn empty_patch_is_a_no_op() {
        let pool = test_pool().await;
        let before = StudentRegistry::add(&pool, &new_student("3rd", "9", "Kiran"))
            .await
            .unwrap();

        StudentRegistry::update(&pool, "3rd", "9", &StudentPatch::default())
            .await
            .unwrap();

        let after = StudentRegistry::get_one(&pool, "3rd", "9").await.unwrap();
        assert_eq!(before, after);
    }

    #[actix_web::test]
    async fn update_missing_student_is_not_found() {
        let pool = test_pool().await;
        let err = StudentRegistry::update(&pool, "9th", "1", &StudentPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Student not found");

        let patch = StudentPatch {
            name: Some("Ghost".into()),
            ..Default::default()
        };
        let err = StudentRegistry::update(&pool, "9th", "1", &patch)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Student not found");
    }

    #[actix_web::test]
    async fn delete_one_cascades_to_linked_receipts_only() {
        let pool = test_pool().await;
        let gone = StudentRegistry::add(&pool, &new_student("4th", "2", "Dev"))
            .await
            .unwrap();
        let kept = StudentRegistry::add(&pool, &new_student("4th", "3", "Isha"))
            .await
            .unwrap();
        linked_receipt(&pool, gone.id, "a").await;
        linked_receipt(&pool, gone.id, "b").await;
        linked_receipt(&pool, kept.id, "c").await;

        let removed = StudentRegistry::delete_one(&pool, "4th", "2").await.unwrap();
        assert_eq!(removed, Removed { students: 1, receipts: 2 });

        let orphans = count(
            &pool,
            &format!("SELECT COUNT(*) FROM receipt WHERE student_id = {}", gone.id),
        )
        .await;
        assert_eq!(orphans, 0);
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM receipt").await, 1);
        assert!(StudentRegistry::get_one(&pool, "4th", "3").await.is_ok());
    }

    #[actix_web::test]
    async fn concurrent_deletes_on_a_shared_file_do_not_collide() {
        let path = std::env::temp_dir().join(format!(
            "school-fees-concurrent-delete-{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let pool = crate::db::init_db(&format!("sqlite://{}", path.display()), 2)
            .await
            .unwrap();

        for roll in ["1", "2"] {
            let s = StudentRegistry::add(&pool, &new_student("8th", roll, "Tara"))
                .await
                .unwrap();
            linked_receipt(&pool, s.id, &format!("k{roll}")).await;
        }

        let a = actix_web::rt::spawn({
            let pool = pool.clone();
            async move { StudentRegistry::delete_one(&pool, "8th", "1").await }
        });
        let b = actix_web::rt::spawn({
            let pool = pool.clone();
            async move { StudentRegistry::delete_one(&pool, "8th", "2").await }
        });

        let removed_a = a.await.unwrap().unwrap();
        let removed_b = b.await.unwrap().unwrap();
        assert_eq!(removed_a, Removed { students: 1, receipts: 1 });
        assert_eq!(removed_b, Removed { students: 1, receipts: 1 });
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM student").await, 0);
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM receipt").await, 0);

        pool.close().await;
        let _ = std::fs::remove_file(&path);
    }

    #[actix_web::test]
    async fn delete_one_missing_student_is_not_found() {
        let pool = test_pool().await;
        let err = StudentRegistry::delete_one(&pool, "4th", "99").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn delete_by_class_clears_students_and_their_receipts() {
        let pool = test_pool().await;
        let a = StudentRegistry::add(&pool, &new_student("6th", "1", "A"))
            .await
            .unwrap();
        let b = StudentRegistry::add(&pool, &new_student("6th", "2", "B"))
            .await
            .unwrap();
        let other = StudentRegistry::add(&pool, &new_student("7th", "1", "C"))
            .await
            .unwrap();
        linked_receipt(&pool, a.id, "r1").await;
        linked_receipt(&pool, b.id, "r2").await;
        linked_receipt(&pool, other.id, "r3").await;
        // Unlinked receipts carry only the snapshot, so they survive.
        sqlx::query("INSERT INTO receipt (class_name, roll, receipt_key) VALUES ('6th', '1', 'r4')")
            .execute(&pool)
            .await
            .unwrap();

        let removed = StudentRegistry::delete_by_class(&pool, "6th").await.unwrap();
        assert_eq!(removed, Removed { students: 2, receipts: 2 });

        assert_eq!(
            count(&pool, "SELECT COUNT(*) FROM student WHERE class_name = '6th'").await,
            0
        );
        let keys: Vec<String> =
            sqlx::query_scalar("SELECT receipt_key FROM receipt ORDER BY id")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(keys, vec!["r3", "r4"]);
    }

    #[actix_web::test]
    async fn delete_by_empty_class_is_not_found() {
        let pool = test_pool().await;
        let err = StudentRegistry::delete_by_class(&pool, "LKG").await.unwrap_err();
        assert_eq!(err.to_string(), "No students in this class");
    }
}
