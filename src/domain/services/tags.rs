use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::models::tag::{is_valid_color, Tag};
use crate::domain::ports::TagRepository;
use crate::domain::services::fetch_guard::Scoped;
use crate::error::AppError;

/// Tag list with a private draft. Edits land in the draft and stay invisible
/// to `committed()` readers until the owner saves them.
///
/// The book remembers which tags the owner touched. Only those are sent on
/// save, so tags that appear or change remotely in the meantime are never
/// overwritten or deleted.
#[derive(Debug, Clone, Default)]
pub struct TagBook {
    company_id: String,
    committed: Vec<Tag>,
    draft: Vec<Tag>,
    edited: HashSet<String>,
    deleted: HashSet<String>,
}

/// Remote calls still owed for the staged edits.
#[derive(Debug, Default, PartialEq)]
pub struct TagChanges {
    pub created: Vec<Tag>,
    pub updated: Vec<Tag>,
    pub deleted: Vec<String>,
}

impl TagChanges {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }
}

impl TagBook {
    pub fn new(company_id: impl Into<String>) -> Self {
        Self { company_id: company_id.into(), ..Default::default() }
    }

    /// Installs a freshly fetched list. Staged edits are laid over it; tags
    /// the owner did not touch take the fetched version.
    pub fn load(&mut self, tags: Vec<Tag>) {
        self.edited.retain(|id| tags.iter().any(|t| &t.id == id));
        self.deleted.retain(|id| tags.iter().any(|t| &t.id == id));

        let mut draft: Vec<Tag> = tags
            .iter()
            .filter(|t| !self.deleted.contains(&t.id))
            .map(|t| {
                if self.edited.contains(&t.id) {
                    self.draft.iter().find(|d| d.id == t.id).cloned().unwrap_or_else(|| t.clone())
                } else {
                    t.clone()
                }
            })
            .collect();
        draft.extend(self.draft.iter().filter(|t| t.is_local()).cloned());

        self.draft = draft;
        self.committed = tags;
    }

    pub fn committed(&self) -> &[Tag] {
        &self.committed
    }

    pub fn draft(&self) -> &[Tag] {
        &self.draft
    }

    pub fn has_changes(&self) -> bool {
        !self.edited.is_empty() || !self.deleted.is_empty() || self.draft.iter().any(Tag::is_local)
    }

    pub fn add(&mut self, name: &str, color: &str) -> Result<Tag, AppError> {
        let name = self.checked_name(name, None)?;
        check_color(color)?;

        let tag = Tag::local(self.company_id.clone(), name, color.to_string());
        self.draft.push(tag.clone());
        Ok(tag)
    }

    pub fn edit(&mut self, id: &str, name: Option<&str>, color: Option<&str>) -> Result<Tag, AppError> {
        let name = match name {
            Some(n) => Some(self.checked_name(n, Some(id))?),
            None => None,
        };
        if let Some(c) = color {
            check_color(c)?;
        }

        let tag = self.editable(id)?;
        if let Some(n) = name {
            tag.name = n;
        }
        if let Some(c) = color {
            tag.color = c.to_string();
        }
        let edited = tag.clone();
        if !edited.is_local() {
            self.edited.insert(edited.id.clone());
        }
        Ok(edited)
    }

    pub fn recolor(&mut self, id: &str, color: &str) -> Result<Tag, AppError> {
        self.edit(id, None, Some(color))
    }

    pub fn delete(&mut self, id: &str) -> Result<(), AppError> {
        let local = self.editable(id)?.is_local();
        self.draft.retain(|t| t.id != id);
        self.edited.remove(id);
        if !local {
            self.deleted.insert(id.to_string());
        }
        Ok(())
    }

    /// Drops every staged edit.
    pub fn reset(&mut self) {
        self.draft = self.committed.clone();
        self.edited.clear();
        self.deleted.clear();
    }

    pub fn changes(&self) -> TagChanges {
        TagChanges {
            created: self.draft.iter().filter(|t| t.is_local()).cloned().collect(),
            updated: self
                .draft
                .iter()
                .filter(|t| self.edited.contains(&t.id))
                .cloned()
                .collect(),
            deleted: self
                .committed
                .iter()
                .filter(|t| self.deleted.contains(&t.id))
                .map(|t| t.id.clone())
                .collect(),
        }
    }

    /// Swaps the local draft entry `local_id` for its stored counterpart.
    fn created(&mut self, local_id: &str, stored: Tag) {
        if let Some(slot) = self.draft.iter_mut().find(|t| t.id == local_id) {
            *slot = stored.clone();
        }
        self.committed.push(stored);
    }

    fn updated(&mut self, stored: Tag) {
        self.edited.remove(&stored.id);
        if let Some(slot) = self.committed.iter_mut().find(|t| t.id == stored.id) {
            *slot = stored;
        }
    }

    fn removed(&mut self, id: &str) {
        self.deleted.remove(id);
        self.committed.retain(|t| t.id != id);
    }

    fn editable(&mut self, id: &str) -> Result<&mut Tag, AppError> {
        let tag = self
            .draft
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::NotFound("Tag not found".into()))?;
        if tag.is_global {
            return Err(AppError::Validation("Global tags cannot be modified".into()));
        }
        Ok(tag)
    }

    fn checked_name(&self, name: &str, except_id: Option<&str>) -> Result<String, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Tag name is required".into()));
        }
        let taken = self
            .draft
            .iter()
            .any(|t| Some(t.id.as_str()) != except_id && t.name.eq_ignore_ascii_case(name));
        if taken {
            return Err(AppError::Conflict(format!("Tag '{}' already exists", name)));
        }
        Ok(name.to_string())
    }
}

fn check_color(color: &str) -> Result<(), AppError> {
    if !is_valid_color(color) {
        return Err(AppError::Validation(format!("Invalid color: {}", color)));
    }
    Ok(())
}

/// Remote-backed owner of a company's [`TagBook`].
pub struct TagService {
    company_id: String,
    repo: Arc<dyn TagRepository>,
    book: Scoped<TagBook>,
}

impl TagService {
    pub fn new(company_id: String, repo: Arc<dyn TagRepository>) -> Self {
        Self {
            book: Scoped::new(company_id.clone(), TagBook::new(company_id.clone())),
            company_id,
            repo,
        }
    }

    /// Last-fetched list. Staged edits are not visible here.
    pub fn tags(&self) -> Vec<Tag> {
        self.book.read(|b| b.committed().to_vec())
    }

    pub fn draft(&self) -> Vec<Tag> {
        self.book.read(|b| b.draft().to_vec())
    }

    pub fn has_changes(&self) -> bool {
        self.book.read(|b| b.has_changes())
    }

    pub async fn refresh(&self) -> Result<(), AppError> {
        let ticket = self.book.begin();
        let tags = self.repo.list(&self.company_id).await?;
        self.book.apply(&ticket, |b| b.load(tags));
        Ok(())
    }

    pub fn add(&self, name: &str, color: &str) -> Result<Tag, AppError> {
        self.book.update(|b| b.add(name, color))
    }

    pub fn edit(&self, id: &str, name: Option<&str>, color: Option<&str>) -> Result<Tag, AppError> {
        self.book.update(|b| b.edit(id, name, color))
    }

    pub fn recolor(&self, id: &str, color: &str) -> Result<Tag, AppError> {
        self.book.update(|b| b.recolor(id, color))
    }

    pub fn delete(&self, id: &str) -> Result<(), AppError> {
        self.book.update(|b| b.delete(id))
    }

    pub fn reset_tags(&self) {
        self.book.update(|b| b.reset());
    }

    /// Commits every staged edit, then reloads the authoritative list. Each
    /// call that succeeds is struck from the staged set at once, so after a
    /// failure a retry only sends what is still owed.
    #[instrument(skip(self), fields(company_id = %self.company_id))]
    pub async fn save_tag_changes(&self) -> Result<(), AppError> {
        let changes = self.book.read(|b| b.changes());
        if changes.is_empty() {
            self.book.update(|b| b.reset());
            return Ok(());
        }

        for local in &changes.created {
            let mut tag = local.clone();
            tag.id = Uuid::new_v4().to_string();
            let stored = self.repo.create(&tag).await?;
            self.book.update(|b| b.created(&local.id, stored));
        }
        for tag in &changes.updated {
            let stored = self.repo.update(tag).await?;
            self.book.update(|b| b.updated(stored));
        }
        for id in &changes.deleted {
            self.repo.delete(&self.company_id, id).await?;
            self.book.update(|b| b.removed(id));
        }

        info!(
            created = changes.created.len(),
            updated = changes.updated.len(),
            deleted = changes.deleted.len(),
            "Tag changes saved"
        );

        let ticket = self.book.begin();
        let tags = self.repo.list(&self.company_id).await?;
        self.book.apply(&ticket, |b| b.load(tags));
        Ok(())
    }
}
