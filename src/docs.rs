use crate::api::student::{DeleteClassRequest, DeleteStudentRequest, UpdateStudentRequest};
use crate::model::fee_structure::{FeeStructure, FeeUpdate};
use crate::model::receipt::{NewReceipt, Receipt, ReceiptEntry};
use crate::model::student::{NewStudent, Student, StudentPatch};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "School Fees API",
        version = "0.1.0",
        description = r#"
## School Fee Management

Record keeping for a school's fee desk.

### 🔹 Key Features
- **Students**
  - Add, list, look up and update students by class and roll
  - Delete a student, or a whole class, together with linked receipts
- **Receipts**
  - Append-only payment ledger, one entry per `receiptKey`
  - History newest-first, or the full ledger in insertion order
- **Fees**
  - Monthly fee per class, seeded from a default table

### 📦 Response Format
Every endpoint answers with a JSON envelope carrying `success`, plus either the
requested data or a `message`.
"#,
    ),
    paths(
        crate::api::health::health,

        crate::api::student::add_student,
        crate::api::student::list_students,
        crate::api::student::get_student,
        crate::api::student::update_student,
        crate::api::student::delete_student,
        crate::api::student::delete_class,

        crate::api::receipt::add_receipt,
        crate::api::receipt::receipt_history,
        crate::api::receipt::list_receipts,
        crate::api::receipt::list_receipt_records,
        crate::api::receipt::delete_receipt,
        crate::api::receipt::delete_all_receipts,

        crate::api::fee::setup_default_fees,
        crate::api::fee::get_fees,
        crate::api::fee::update_fee,
        crate::api::fee::reset_fees
    ),
    components(
        schemas(
            Student,
            NewStudent,
            StudentPatch,
            UpdateStudentRequest,
            DeleteStudentRequest,
            DeleteClassRequest,
            Receipt,
            ReceiptEntry,
            NewReceipt,
            FeeStructure,
            FeeUpdate
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Student", description = "Student registry APIs"),
        (name = "Receipt", description = "Receipt ledger APIs"),
        (name = "Fees", description = "Fee schedule APIs"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();

        for expected in [
            "/health",
            "/student/add",
            "/student/{class_name}/{roll}",
            "/receipt/add",
            "/receipt/delete/{id}",
            "/fees/update",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {expected}");
        }
    }
}
