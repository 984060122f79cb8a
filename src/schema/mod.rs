use serde::{Deserialize, Serialize};

use crate::models::{course::Course, instructor::Instructor, Record};

#[derive(Deserialize, Serialize)]
pub struct PasswordForm{
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct SigninResponse{
    pub message: String,
    pub token: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse{
    pub message: String,
}

#[derive(Deserialize, Default)]
pub struct DeleteQuery{
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Deserialize, Serialize, Default)]
pub struct RevalidateRequest{
    pub path: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RevalidateResponse{
    pub revalidated: bool,
    /// Milliseconds since the Unix epoch.
    pub now: i64,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct DashboardResponse{
    pub total_courses: usize,
    pub total_instructors: usize,
    pub total_testimonials: usize,
    pub recent_courses: Vec<Course>,
    pub instructors: Vec<Instructor>,
}

/// Result of an admin write: the user-facing notice plus what was persisted.
#[derive(Serialize, Deserialize, Debug)]
pub struct WriteResponse<F>{
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<Record<F>>,
    /// False when any cache revalidation after the write failed.
    pub revalidated: bool,
}

#[cfg(test)]
mod tests{
    use serde_json::json;

    use super::*;
    use crate::models::course::CourseFields;

    #[test]
    fn delete_response_reads_back_without_a_record(){
        let body = json!({ "message": "Course deleted successfully", "revalidated": true });

        let response: WriteResponse<CourseFields> = serde_json::from_value(body).unwrap();

        assert!(response.record.is_none());
        assert!(response.revalidated);
    }
}
