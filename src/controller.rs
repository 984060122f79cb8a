//! Admin CRUD workflow.
//!
//! Every successful write runs in this order: persist, update the session's local list,
//! revalidate the affected public pages, report success. A failed persist stops the
//! sequence; a failed revalidation is logged and the write stands.
//!
//! Workspaces live as long as the session that opened them and are dropped once it expires.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    auth::Session,
    cache::Revalidate,
    errors::CustomError,
    locks::mutex_lock,
    models::{
        course::get_all_courses,
        instructor::get_all_instructors,
        testimonial::get_all_testimonials,
        Record,
    },
    schema::{DashboardResponse, WriteResponse},
    store::{Collection, Store},
    workspace::{AdminEntity, AdminWorkspace, FormTarget, SubmissionInProgress},
};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Failed to {action} {noun}. Please try again.")]
    Failed { action: &'static str, noun: &'static str },
    #[error("No {noun} with id {id}")]
    NotFound { noun: &'static str, id: String },
    #[error("Are you sure you want to delete this {noun}?")]
    ConfirmationRequired { noun: &'static str },
    #[error("Still saving the previous {noun}, please wait")]
    SubmissionInProgress { noun: &'static str },
    #[error("Session ended, sign in again")]
    NoWorkspace,
}

impl AdminError {
    fn in_progress<F: AdminEntity>(_: SubmissionInProgress) -> Self {
        AdminError::SubmissionInProgress { noun: F::NOUN }
    }
}

impl ResponseError for AdminError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(CustomError::new(self.to_string()))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AdminError::Failed { .. } => StatusCode::BAD_GATEWAY,
            AdminError::NotFound { .. } => StatusCode::NOT_FOUND,
            AdminError::ConfirmationRequired { .. } => StatusCode::BAD_REQUEST,
            AdminError::SubmissionInProgress { .. } => StatusCode::CONFLICT,
            AdminError::NoWorkspace => StatusCode::UNAUTHORIZED,
        }
    }
}

struct OpenWorkspace {
    /// Unix seconds, copied from the session.
    expires_at: i64,
    workspace: AdminWorkspace,
}

pub struct AdminController {
    store: Store,
    revalidator: Arc<dyn Revalidate>,
    workspaces: Mutex<HashMap<String, OpenWorkspace>>,
}

impl AdminController {
    pub fn new(store: Store, revalidator: Arc<dyn Revalidate>) -> Self {
        Self {
            store,
            revalidator,
            workspaces: Mutex::new(HashMap::new()),
        }
    }

    /// Starts an empty workspace for `session`, dropping those of expired sessions.
    pub fn open(&self, session: &Session) {
        let now = Utc::now().timestamp();
        let mut workspaces = mutex_lock(&self.workspaces, "admin.open");

        let before = workspaces.len();
        workspaces.retain(|_, open| open.expires_at > now);
        if workspaces.len() < before {
            debug!(dropped = before - workspaces.len(), "Closed workspaces of expired sessions");
        }

        workspaces.insert(
            session.id.clone(),
            OpenWorkspace {
                expires_at: session.expires_at,
                workspace: AdminWorkspace::default(),
            },
        );
    }

    pub fn close(&self, session: &Session) {
        mutex_lock(&self.workspaces, "admin.close").remove(&session.id);
    }

    // The lock is never held across an await.
    fn with_workspace<T>(
        &self,
        session: &Session,
        f: impl FnOnce(&mut AdminWorkspace) -> Result<T, AdminError>,
    ) -> Result<T, AdminError> {
        let mut workspaces = mutex_lock(&self.workspaces, "admin.with_workspace");
        let open = workspaces.get_mut(&session.id).ok_or(AdminError::NoWorkspace)?;
        if open.expires_at <= Utc::now().timestamp() {
            workspaces.remove(&session.id);
            return Err(AdminError::NoWorkspace);
        }
        f(&mut open.workspace)
    }

    /// Reloads all three lists and summarises them.
    pub async fn dashboard(&self, session: &Session) -> Result<DashboardResponse, AdminError> {
        self.with_workspace(session, |_| Ok(()))?;

        let (courses, instructors, testimonials) = futures_util::join!(
            get_all_courses(&self.store),
            get_all_instructors(&self.store),
            get_all_testimonials(&self.store),
        );

        self.with_workspace(session, move |workspace| {
            workspace.courses = courses;
            workspace.instructors = instructors;
            workspace.testimonials = testimonials;

            Ok(DashboardResponse {
                total_courses: workspace.courses.len(),
                total_instructors: workspace.instructors.len(),
                total_testimonials: workspace.testimonials.len(),
                recent_courses: workspace.courses.iter().take(3).cloned().collect(),
                instructors: workspace.instructors.iter().take(3).cloned().collect(),
            })
        })
    }

    pub fn list<F: AdminEntity>(&self, session: &Session) -> Result<Vec<Record<F>>, AdminError> {
        self.with_workspace(session, |workspace| Ok(F::local(workspace).clone()))
    }

    /// Opens the edit form for a record.
    pub async fn edit<F: AdminEntity>(&self, session: &Session, id: &str) -> Result<Record<F>, AdminError> {
        self.with_workspace(session, |workspace| {
            workspace
                .edit(F::COLLECTION, FormTarget::Existing(id.to_string()))
                .map_err(AdminError::in_progress::<F>)
        })?;

        match F::fetch(&self.store, id).await {
            Some(record) => Ok(record),
            None => {
                self.with_workspace(session, |workspace| {
                    workspace.settle(F::COLLECTION);
                    Ok(())
                })?;
                Err(AdminError::NotFound { noun: F::NOUN, id: id.to_string() })
            }
        }
    }

    pub async fn create<F: AdminEntity>(&self, session: &Session, fields: F) -> Result<WriteResponse<F>, AdminError> {
        self.begin::<F>(session, FormTarget::New)?;

        let created = F::create(&self.store, fields).await;
        let record = self.finish(session, F::COLLECTION, created.ok_or(AdminError::Failed { action: "add", noun: F::NOUN }), |workspace, record| {
            workspace.upsert(record.clone())
        })?;

        let revalidated = self.revalidate(F::affected_paths(&record.id, Some(&record))).await;
        info!(collection = %F::COLLECTION, id = %record.id, "Created record");

        Ok(WriteResponse {
            message: format!("{} added successfully!", F::TITLE),
            record: Some(record),
            revalidated,
        })
    }

    pub async fn update<F: AdminEntity>(
        &self,
        session: &Session,
        id: &str,
        patch: F::Patch,
    ) -> Result<WriteResponse<F>, AdminError> {
        self.begin::<F>(session, FormTarget::Existing(id.to_string()))?;

        // pages of the record as it was must go too, e.g. a course's former instructor
        let previous = F::fetch(&self.store, id).await;
        let updated = F::update(&self.store, id, patch).await;
        let record = self.finish(session, F::COLLECTION, updated.ok_or(AdminError::Failed { action: "update", noun: F::NOUN }), |workspace, record| {
            workspace.upsert(record.clone())
        })?;

        let mut paths = F::affected_paths(id, previous.as_ref());
        paths.extend(F::affected_paths(&record.id, Some(&record)));
        let revalidated = self.revalidate(paths).await;
        info!(collection = %F::COLLECTION, id = %record.id, "Updated record");

        Ok(WriteResponse {
            message: format!("{} updated successfully!", F::TITLE),
            record: Some(record),
            revalidated,
        })
    }

    /// Nothing is deleted unless `confirmed` is set.
    pub async fn delete<F: AdminEntity>(
        &self,
        session: &Session,
        id: &str,
        confirmed: bool,
    ) -> Result<WriteResponse<F>, AdminError> {
        if !confirmed {
            return Err(AdminError::ConfirmationRequired { noun: F::NOUN });
        }
        self.begin::<F>(session, FormTarget::Existing(id.to_string()))?;

        // the local list may not hold the record, so ask the store what is being deleted
        let previous = F::fetch(&self.store, id).await;
        let outcome = if F::delete(&self.store, id).await {
            Ok(())
        } else {
            Err(AdminError::Failed { action: "delete", noun: F::NOUN })
        };
        let mut removed = None;
        self.finish(session, F::COLLECTION, outcome, |workspace, _| {
            removed = workspace.remove::<F>(id);
        })?;

        let revalidated = self.revalidate(F::affected_paths(id, previous.or(removed).as_ref())).await;
        info!(collection = %F::COLLECTION, id, "Deleted record");

        Ok(WriteResponse {
            message: format!("{} deleted successfully", F::TITLE),
            record: None,
            revalidated,
        })
    }

    fn begin<F: AdminEntity>(&self, session: &Session, target: FormTarget) -> Result<(), AdminError> {
        self.with_workspace(session, |workspace| {
            workspace
                .submit(F::COLLECTION, target)
                .map_err(AdminError::in_progress::<F>)
        })
    }

    /// Settles the form and, on success, applies the result to the local list.
    fn finish<T>(
        &self,
        session: &Session,
        collection: Collection,
        outcome: Result<T, AdminError>,
        apply: impl FnOnce(&mut AdminWorkspace, &T),
    ) -> Result<T, AdminError> {
        let mut workspaces = mutex_lock(&self.workspaces, "admin.finish");
        // a session that logged out mid-write has no list left to update
        if let Some(OpenWorkspace { workspace, .. }) = workspaces.get_mut(&session.id) {
            workspace.settle(collection);
            if let Ok(value) = &outcome {
                apply(workspace, value);
            }
        }
        outcome
    }

    /// Revalidates each distinct path once, in order.
    async fn revalidate(&self, paths: Vec<String>) -> bool {
        let mut all_ok = true;
        let mut seen = HashSet::new();
        for path in paths {
            if !seen.insert(path.clone()) {
                continue;
            }
            if let Err(err) = self.revalidator.revalidate(&path).await {
                warn!(path = %path, error = %err, "Error revalidating");
                all_ok = false;
            }
        }
        all_ok
    }
}
