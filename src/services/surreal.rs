use crate::services::{
    AchievementRecord, AchievementTypeRecord, ActionLogEntry, AdminRecord, AspirationPage,
    AspirationRecord, BemProfileRecord, CarouselSlideRecord, ChatbotRuleRecord, DirectorRecord,
    ImageUpload, PageLink, PortalContext, PortalError, PortalService, SeoMetaRecord,
    ServiceResult, SessionCheckMode, StoredImage,
};
use crate::surreal::{
    create_achievement as surreal_create_achievement,
    create_aspiration as surreal_create_aspiration,
    delete_achievement as surreal_delete_achievement,
    list_achievements as surreal_list_achievements, list_aspirations as surreal_list_aspirations,
    SurrealAchievement, SurrealAspiration, SurrealClient,
};
use serde_json::Value;

/// Surreal-backed portal service covering the publicly served resources,
/// achievements and aspirations. The remaining admin screens keep running on
/// the in-memory store; their methods answer with benign defaults or an
/// explicit unsupported error.
#[derive(Clone)]
pub struct SurrealService {
    client: SurrealClient,
}

impl SurrealService {
    pub fn new(client: SurrealClient) -> Self {
        Self { client }
    }

    fn runtime(&self) -> ServiceResult<tokio::runtime::Runtime> {
        tokio::runtime::Runtime::new()
            .map_err(|e| PortalError::Internal(format!("runtime init failed: {e}")))
    }

    fn unsupported<T>(&self, what: &str) -> ServiceResult<T> {
        Err(PortalError::Internal(format!(
            "{what} is not available on the surreal backend"
        )))
    }

    fn record_key(id: &Option<String>) -> i64 {
        // Surreal ids look like "achievement:⟨uuid⟩"; derive a stable numeric
        // key from the tail for list ordering.
        id.as_deref()
            .and_then(|raw| raw.rsplit(':').next())
            .map(|tail| {
                tail.bytes()
                    .fold(0i64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as i64))
                    .abs()
            })
            .unwrap_or(0)
    }
}

impl PortalService for SurrealService {
    fn check_session(&self, _ctx: &PortalContext, _mode: SessionCheckMode) -> ServiceResult<()> {
        Ok(())
    }

    fn allowed_to(&self, ctx: &PortalContext, permission: &str) -> bool {
        ctx.user_info.is_admin || ctx.user_info.permissions.contains(permission)
    }

    fn log_action(
        &self,
        _action: &str,
        _admin_id: Option<i64>,
        _details: &Value,
    ) -> ServiceResult<()> {
        Ok(())
    }

    fn list_action_logs(&self) -> ServiceResult<Vec<ActionLogEntry>> {
        Ok(Vec::new())
    }

    fn list_achievements(&self) -> ServiceResult<Vec<AchievementRecord>> {
        let rt = self.runtime()?;
        let rows = rt
            .block_on(surreal_list_achievements(&self.client))
            .map_err(|e| PortalError::Internal(e.to_string()))?;
        Ok(rows
            .into_iter()
            .map(|row| AchievementRecord {
                id: Self::record_key(&row.id),
                title: row.title,
                student_name: row.student_name,
                description: row.description,
                type_id: 0,
                achieved_at: row
                    .achieved_at
                    .and_then(|raw| raw.parse().ok()),
                image: None,
            })
            .collect())
    }

    fn get_achievement(&self, id: i64) -> ServiceResult<Option<AchievementRecord>> {
        Ok(self
            .list_achievements()?
            .into_iter()
            .find(|row| row.id == id))
    }

    fn save_achievement(&self, record: AchievementRecord) -> ServiceResult<i64> {
        let rt = self.runtime()?;
        let created = rt
            .block_on(surreal_create_achievement(
                &self.client,
                SurrealAchievement {
                    id: None,
                    title: record.title,
                    student_name: record.student_name,
                    description: record.description,
                    type_name: None,
                    achieved_at: record.achieved_at.map(|ts| ts.to_rfc3339()),
                },
            ))
            .map_err(|e| PortalError::Internal(e.to_string()))?;
        Ok(Self::record_key(&created.id))
    }

    fn delete_achievement(&self, id: i64) -> ServiceResult<()> {
        let rt = self.runtime()?;
        let rows = rt
            .block_on(surreal_list_achievements(&self.client))
            .map_err(|e| PortalError::Internal(e.to_string()))?;
        let target = rows
            .into_iter()
            .find(|row| Self::record_key(&row.id) == id)
            .and_then(|row| row.id)
            .ok_or_else(|| PortalError::NotFound(format!("achievement {id}")))?;
        rt.block_on(surreal_delete_achievement(&self.client, &target))
            .map_err(|e| PortalError::Internal(e.to_string()))
    }

    fn list_achievement_types(&self) -> ServiceResult<Vec<AchievementTypeRecord>> {
        Ok(Vec::new())
    }

    fn save_achievement_type(&self, _record: AchievementTypeRecord) -> ServiceResult<i64> {
        self.unsupported("achievement type management")
    }

    fn delete_achievement_type(&self, _id: i64) -> ServiceResult<()> {
        self.unsupported("achievement type management")
    }

    fn achievements_with_type(&self, _type_id: i64) -> ServiceResult<usize> {
        Ok(0)
    }

    fn list_bem_profiles(&self) -> ServiceResult<Vec<BemProfileRecord>> {
        Ok(Vec::new())
    }

    fn save_bem_profile(&self, _record: BemProfileRecord) -> ServiceResult<i64> {
        self.unsupported("bem profile management")
    }

    fn delete_bem_profile(&self, _id: i64) -> ServiceResult<()> {
        self.unsupported("bem profile management")
    }

    fn list_carousel_slides(&self) -> ServiceResult<Vec<CarouselSlideRecord>> {
        Ok(Vec::new())
    }

    fn save_carousel_slide(&self, _record: CarouselSlideRecord) -> ServiceResult<i64> {
        self.unsupported("carousel management")
    }

    fn delete_carousel_slide(&self, _id: i64) -> ServiceResult<()> {
        self.unsupported("carousel management")
    }

    fn set_carousel_active(&self, _id: i64, _active: bool) -> ServiceResult<()> {
        self.unsupported("carousel management")
    }

    fn list_chatbot_rules(&self) -> ServiceResult<Vec<ChatbotRuleRecord>> {
        Ok(Vec::new())
    }

    fn save_chatbot_rule(&self, _record: ChatbotRuleRecord) -> ServiceResult<i64> {
        self.unsupported("chatbot management")
    }

    fn delete_chatbot_rule(&self, _id: i64) -> ServiceResult<()> {
        self.unsupported("chatbot management")
    }

    fn set_chatbot_rule_active(&self, _id: i64, _active: bool) -> ServiceResult<()> {
        self.unsupported("chatbot management")
    }

    fn chatbot_fallback(&self) -> ServiceResult<String> {
        Ok("Maaf, pertanyaan belum dapat dijawab.".into())
    }

    fn set_chatbot_fallback(&self, _reply: &str) -> ServiceResult<()> {
        self.unsupported("chatbot management")
    }

    fn list_directors(&self) -> ServiceResult<Vec<DirectorRecord>> {
        Ok(Vec::new())
    }

    fn save_director(&self, _record: DirectorRecord) -> ServiceResult<i64> {
        self.unsupported("director management")
    }

    fn delete_director(&self, _id: i64) -> ServiceResult<()> {
        self.unsupported("director management")
    }

    fn aspiration_page(&self, start: usize, limit: usize) -> ServiceResult<AspirationPage> {
        let rt = self.runtime()?;
        let rows = rt
            .block_on(surreal_list_aspirations(&self.client))
            .map_err(|e| PortalError::Internal(e.to_string()))?;
        let total = rows.len();
        let unread = rows.iter().filter(|row| !row.is_read).count();
        let limit = limit.max(1);
        let start = if total == 0 { 0 } else { start.min(total - 1) };
        let entries: Vec<_> = rows
            .into_iter()
            .skip(start)
            .take(limit)
            .map(|row| AspirationRecord {
                id: Self::record_key(&row.id),
                sender_name: row.sender_name,
                email: row.email,
                subject: row.subject,
                body: row.body,
                is_read: row.is_read,
                created_at: None,
            })
            .collect();
        let mut page_links = Vec::new();
        let mut offset = 0;
        let mut number = 1;
        while offset < total.max(1) {
            page_links.push(PageLink {
                label: number.to_string(),
                start: offset,
                active: start >= offset && start < offset + limit,
            });
            offset += limit;
            number += 1;
        }
        Ok(AspirationPage {
            start,
            total,
            unread,
            page_links,
            entries,
        })
    }

    fn submit_aspiration(&self, record: AspirationRecord) -> ServiceResult<i64> {
        let rt = self.runtime()?;
        let created = rt
            .block_on(surreal_create_aspiration(
                &self.client,
                SurrealAspiration {
                    id: None,
                    sender_name: record.sender_name,
                    email: record.email,
                    subject: record.subject,
                    body: record.body,
                    is_read: false,
                    created_at: None,
                },
            ))
            .map_err(|e| PortalError::Internal(e.to_string()))?;
        Ok(Self::record_key(&created.id))
    }

    fn mark_aspiration_read(&self, _id: i64, _read: bool) -> ServiceResult<()> {
        self.unsupported("aspiration triage")
    }

    fn delete_aspiration(&self, _id: i64) -> ServiceResult<()> {
        self.unsupported("aspiration triage")
    }

    fn list_seo_meta(&self) -> ServiceResult<Vec<SeoMetaRecord>> {
        Ok(Vec::new())
    }

    fn get_seo_meta(&self, _page_key: &str) -> ServiceResult<Option<SeoMetaRecord>> {
        Ok(None)
    }

    fn save_seo_meta(&self, _record: SeoMetaRecord) -> ServiceResult<i64> {
        self.unsupported("seo meta management")
    }

    fn delete_seo_meta(&self, _id: i64) -> ServiceResult<()> {
        self.unsupported("seo meta management")
    }

    fn store_image(&self, _upload: ImageUpload) -> ServiceResult<StoredImage> {
        self.unsupported("image storage")
    }

    fn delete_image(&self, _id: i64) -> ServiceResult<()> {
        self.unsupported("image storage")
    }

    fn find_admin_by_email(&self, _email: &str) -> ServiceResult<Option<AdminRecord>> {
        Ok(None)
    }

    fn get_admin(&self, _id: i64) -> ServiceResult<Option<AdminRecord>> {
        Ok(None)
    }

    fn update_admin_password(&self, _admin_id: i64, _password_hash: &str) -> ServiceResult<()> {
        self.unsupported("admin accounts")
    }

    fn reset_secret(&self) -> ServiceResult<String> {
        self.unsupported("admin accounts")
    }
}
