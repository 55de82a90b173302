use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::model::roll;
use crate::model::student::{NewStudent, StudentPatch};
use crate::store::StudentRegistry;

#[derive(Deserialize, ToSchema)]
pub struct UpdateStudentRequest {
    #[schema(example = "5th")]
    pub class: String,
    #[serde(deserialize_with = "roll::deserialize")]
    #[schema(example = "12", value_type = String)]
    pub roll: String,
    #[serde(default)]
    pub student: StudentPatch,
}

#[derive(Deserialize, ToSchema)]
pub struct DeleteStudentRequest {
    #[schema(example = "5th")]
    pub class: Option<String>,
    #[serde(default, deserialize_with = "roll::option::deserialize")]
    #[schema(example = "12", value_type = Option<String>)]
    pub roll: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct DeleteClassRequest {
    #[schema(example = "5th")]
    pub class: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Add Student
#[utoipa::path(
    post,
    path = "/student/add",
    request_body = NewStudent,
    responses(
        (status = 200, description = "Student created", body = Object, example = json!({
            "success": true,
            "student": {
                "id": 1, "name": "Aarav Sharma", "father": "Rakesh Sharma",
                "class_name": "5th", "roll": "12", "previous_due": 0, "advance": 0, "months": {}
            }
        })),
        (status = 400, description = "Malformed payload"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Student"
)]
pub async fn add_student(
    pool: web::Data<SqlitePool>,
    payload: web::Json<NewStudent>,
) -> AppResult<HttpResponse> {
    let student = StudentRegistry::add(pool.get_ref(), &payload).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "student": student
    })))
}

#[utoipa::path(
    get,
    path = "/students",
    responses(
        (status = 200, description = "Every student", body = Object, example = json!({
            "success": true,
            "students": []
        }))
    ),
    tag = "Student"
)]
pub async fn list_students(pool: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    let students = StudentRegistry::get_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "students": students
    })))
}

/// Get Student by class and roll
#[utoipa::path(
    get,
    path = "/student/{class_name}/{roll}",
    params(
        ("class_name", Path, description = "Class name"),
        ("roll", Path, description = "Roll number within the class")
    ),
    responses(
        (status = 200, description = "Student found", body = Object),
        (status = 404, description = "Student not found", body = Object, example = json!({
            "success": false,
            "message": "Student not found"
        }))
    ),
    tag = "Student"
)]
pub async fn get_student(
    pool: web::Data<SqlitePool>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (class_name, roll) = path.into_inner();
    let student = StudentRegistry::get_one(pool.get_ref(), &class_name, &roll).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "student": student
    })))
}

/// Update Student
#[utoipa::path(
    post,
    path = "/update_student",
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated", body = Object, example = json!({
            "success": true,
            "message": "Student updated successfully"
        })),
        (status = 404, description = "Student not found", body = Object, example = json!({
            "success": false,
            "message": "Student not found"
        }))
    ),
    tag = "Student"
)]
pub async fn update_student(
    pool: web::Data<SqlitePool>,
    payload: web::Json<UpdateStudentRequest>,
) -> AppResult<HttpResponse> {
    StudentRegistry::update(pool.get_ref(), &payload.class, &payload.roll, &payload.student)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Student updated successfully"
    })))
}

/// Delete Student and its receipts
#[utoipa::path(
    post,
    path = "/student/delete",
    request_body = DeleteStudentRequest,
    responses(
        (status = 200, description = "Student deleted", body = Object, example = json!({
            "success": true,
            "message": "Student deleted"
        })),
        (status = 400, description = "Missing class or roll"),
        (status = 404, description = "Student not found")
    ),
    tag = "Student"
)]
pub async fn delete_student(
    pool: web::Data<SqlitePool>,
    payload: web::Json<DeleteStudentRequest>,
) -> AppResult<HttpResponse> {
    let payload = payload.into_inner();
    let (Some(class_name), Some(roll)) = (present(payload.class), present(payload.roll)) else {
        return Err(AppError::Validation("Missing class or roll".to_string()));
    };

    StudentRegistry::delete_one(pool.get_ref(), &class_name, &roll).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Student deleted"
    })))
}

/// Delete every student of a class and their receipts
#[utoipa::path(
    post,
    path = "/student/delete_class",
    request_body = DeleteClassRequest,
    responses(
        (status = 200, description = "Class deleted", body = Object, example = json!({
            "success": true,
            "message": "All students in 5th deleted"
        })),
        (status = 400, description = "Missing class"),
        (status = 404, description = "No students in this class")
    ),
    tag = "Student"
)]
pub async fn delete_class(
    pool: web::Data<SqlitePool>,
    payload: web::Json<DeleteClassRequest>,
) -> AppResult<HttpResponse> {
    let class_name = present(payload.into_inner().class)
        .ok_or_else(|| AppError::Validation("Missing class".to_string()))?;

    StudentRegistry::delete_by_class(pool.get_ref(), &class_name).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("All students in {class_name} deleted")
    })))
}
