use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use super::session::Session;
use crate::backend::Backend;
use crate::models::{parse_url, Bookmark, NewBookmark};
use crate::utils::{AuthError, FormError, ValidationError};

const FALLBACK_ERROR: &str = "Failed to add bookmark";

#[derive(Debug, Default)]
struct Fields {
    url: String,
    title: String,
    error: Option<String>,
}

/// The add-bookmark form.
///
/// At most one submission is in flight per form: `submit` claims the pending
/// flag on entry and a concurrent call returns [`FormError::Busy`] without
/// reaching the store.
#[derive(Debug, Default)]
pub struct AddBookmarkForm {
    fields: Mutex<Fields>,
    loading: AtomicBool,
}

struct Pending<'a>(&'a AtomicBool);

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl AddBookmarkForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(url: impl Into<String>, title: impl Into<String>) -> Self {
        let form = Self::new();
        form.set_url(url);
        form.set_title(title);
        form
    }

    fn fields(&self) -> MutexGuard<'_, Fields> {
        self.fields.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_url(&self, url: impl Into<String>) {
        self.fields().url = url.into();
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.fields().title = title.into();
    }

    pub fn url(&self) -> String {
        self.fields().url.clone()
    }

    pub fn title(&self) -> String {
        self.fields().title.clone()
    }

    /// The message shown under the form, if the last submission failed.
    pub fn error(&self) -> Option<String> {
        self.fields().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub async fn submit(
        &self,
        backend: &Backend,
        session: Option<&Session>,
    ) -> Result<Bookmark, FormError> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("ignoring submit while another one is pending");
            return Err(FormError::Busy);
        }
        let _pending = Pending(&self.loading);
        self.fields().error = None;

        let result = self.insert(backend, session).await;
        let mut fields = self.fields();
        match &result {
            Ok(created) => {
                info!(id = created.id, "bookmark added");
                fields.url.clear();
                fields.title.clear();
            }
            Err(e) => {
                let message = e.to_string();
                debug!(error = %message, "bookmark rejected");
                fields.error = Some(if message.is_empty() {
                    FALLBACK_ERROR.to_string()
                } else {
                    message
                });
            }
        }
        result
    }

    async fn insert(
        &self,
        backend: &Backend,
        session: Option<&Session>,
    ) -> Result<Bookmark, FormError> {
        let (url, title) = {
            let fields = self.fields();
            (fields.url.clone(), fields.title.clone())
        };

        parse_url(&url)?;
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        let session = session.ok_or(AuthError::MissingSession)?;

        let created = backend
            .insert(NewBookmark {
                user_id: session.user_id().to_string(),
                title,
                url,
            })
            .await?;
        Ok(created)
    }
}
