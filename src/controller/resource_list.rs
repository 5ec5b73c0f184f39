use chrono::{DateTime, Utc};

use crate::confirm::ConfirmationModal;
use crate::gateway::{Completion, MutationGateway, SubmitSpec};
use crate::listing::{self, Listable, SortDirection};
use crate::notification::{NotificationBanner, Severity};
use crate::services::ServiceResult;

/// Drives one admin index screen: the fetched rows, the search box, the
/// delete confirmation, and the banner. Every entity page is an instance of
/// this over its own record type.
///
/// Rows are only replaced after the service acknowledges a mutation; nothing
/// is updated optimistically.
pub struct ResourceListController<R: Listable + Clone> {
    rows: Vec<R>,
    query: String,
    direction: SortDirection,
    pub banner: NotificationBanner,
    pub modal: ConfirmationModal,
    pub gateway: MutationGateway,
}

impl<R: Listable + Clone> Default for ResourceListController<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Listable + Clone> ResourceListController<R> {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            query: String::new(),
            direction: SortDirection::Ascending,
            banner: NotificationBanner::new(),
            modal: ConfirmationModal::new(),
            gateway: MutationGateway::new(),
        }
    }

    pub fn load(&mut self, rows: Vec<R>) {
        self.rows = rows;
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn set_direction(&mut self, direction: SortDirection) {
        self.direction = direction;
    }

    pub fn toggle_direction(&mut self) {
        self.direction = self.direction.reversed();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The rows the grid renders right now: filtered by the search box and
    /// ordered by the given sort field.
    pub fn visible<K: Ord>(&self, sort_key: impl Fn(&R) -> K) -> Vec<R> {
        listing::apply(&self.rows, &self.query, sort_key, self.direction)
    }

    pub fn request_delete(&mut self, target: i64) {
        self.modal.open(target);
    }

    pub fn cancel_delete(&mut self) {
        self.modal.cancel();
    }

    /// Confirmed delete: runs the mutation through the modal and gateway,
    /// reloads the list only on acknowledged success, and raises the banner
    /// from the completion. Returns the completion when the mutation actually
    /// ran.
    pub fn confirm_delete(
        &mut self,
        spec: &SubmitSpec,
        now: DateTime<Utc>,
        delete: impl FnOnce(i64) -> ServiceResult<()>,
        reload: impl FnOnce() -> ServiceResult<Vec<R>>,
    ) -> Option<Completion> {
        let completion = self.modal.confirm(&mut self.gateway, spec, delete)?;
        if completion.succeeded {
            if let Ok(rows) = reload() {
                self.rows = rows;
            }
        }
        if let Some((severity, message)) = &completion.notification {
            self.banner.show(message, *severity, now);
        }
        Some(completion)
    }

    /// Raise a banner directly, e.g. from a flash message carried across a
    /// redirect.
    pub fn notify(&mut self, severity: Severity, message: &str, now: DateTime<Utc>) {
        self.banner.show(message, severity, now);
    }

    /// Advance the banner's auto-dismiss timer.
    pub fn poll(&mut self, now: DateTime<Utc>) {
        self.banner.poll(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{AchievementRecord, InMemoryService, PortalService};
    use chrono::Duration;

    fn controller_with_sample(
        service: &InMemoryService,
    ) -> ResourceListController<AchievementRecord> {
        let mut controller = ResourceListController::new();
        controller.load(service.list_achievements().unwrap());
        controller
    }

    #[test]
    fn search_narrows_visible_rows() {
        let service = InMemoryService::default();
        let mut controller = controller_with_sample(&service);
        assert_eq!(controller.visible(|row| row.id).len(), 2);
        controller.set_query("medali");
        let visible = controller.visible(|row| row.id);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, 2);
    }

    #[test]
    fn confirmed_delete_refreshes_list_and_raises_banner() {
        let service = InMemoryService::default();
        let mut controller = controller_with_sample(&service);
        let now = Utc::now();
        controller.request_delete(1);
        let spec = SubmitSpec::new("achievements.destroy", "Prestasi dihapus");
        let completion = controller
            .confirm_delete(
                &spec,
                now,
                |id| service.delete_achievement(id),
                || service.list_achievements(),
            )
            .unwrap();
        assert!(completion.succeeded);
        assert_eq!(controller.len(), 1);
        assert!(controller.banner.is_visible());
        assert_eq!(controller.banner.message(), Some("Prestasi dihapus"));
    }

    #[test]
    fn cancelled_delete_changes_nothing() {
        let service = InMemoryService::default();
        let mut controller = controller_with_sample(&service);
        controller.request_delete(1);
        controller.cancel_delete();
        let spec = SubmitSpec::new("achievements.destroy", "Prestasi dihapus");
        let outcome = controller.confirm_delete(
            &spec,
            Utc::now(),
            |id| service.delete_achievement(id),
            || service.list_achievements(),
        );
        assert!(outcome.is_none());
        assert_eq!(controller.len(), 2);
        assert!(!controller.banner.is_visible());
        assert_eq!(service.list_achievements().unwrap().len(), 2);
    }

    #[test]
    fn failed_delete_keeps_rows_but_reports() {
        let service = InMemoryService::default();
        let mut controller = controller_with_sample(&service);
        controller.request_delete(99);
        let spec = SubmitSpec::new("achievements.destroy", "Prestasi dihapus");
        let completion = controller
            .confirm_delete(
                &spec,
                Utc::now(),
                |id| service.delete_achievement(id),
                || service.list_achievements(),
            )
            .unwrap();
        assert!(!completion.succeeded);
        assert_eq!(controller.len(), 2);
        assert_eq!(controller.banner.severity(), Some(Severity::Error));
    }

    #[test]
    fn banner_auto_dismisses_through_poll() {
        let service = InMemoryService::default();
        let mut controller = controller_with_sample(&service);
        let now = Utc::now();
        controller.notify(Severity::Success, "Data tersimpan", now);
        controller.poll(now + Duration::milliseconds(5000));
        assert!(!controller.banner.is_visible());
    }
}
