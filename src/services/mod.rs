use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub mod surreal;

pub type ServiceResult<T> = Result<T, PortalError>;

/// Field-keyed validation errors, ordered by field name so rendering and
/// logging stay deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(pub BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("session timeout")]
    SessionTimeout,
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl PortalError {
    pub fn invalid(field: &str, message: &str) -> Self {
        PortalError::Validation(FieldErrors::single(field, message))
    }
}

#[derive(Clone, Debug, Default)]
pub struct DataBag {
    inner: HashMap<String, Value>,
}

impl DataBag {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        self.inner.insert(
            key.to_string(),
            serde_json::to_value(value).unwrap_or(Value::Null),
        );
    }

    pub fn remove(&mut self, key: &str) {
        self.inner.remove(key);
    }

    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.inner.remove(key)
    }

    pub fn bool(&self, key: &str) -> bool {
        self.inner
            .get(key)
            .and_then(|value| value.as_bool())
            .unwrap_or(false)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.inner.get(key).and_then(|value| value.as_i64())
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.inner
            .get(key)
            .and_then(|value| value.as_str().map(|s| s.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }
}

#[derive(Clone, Debug, Default)]
pub struct RequestVars {
    data: DataBag,
}

impl RequestVars {
    pub fn new() -> Self {
        Self {
            data: DataBag::new(),
        }
    }

    pub fn bool(&self, key: &str) -> bool {
        self.data.bool(key)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.data.int(key)
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.data.string(key)
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        self.data.set(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.data.remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains(key)
    }
}

#[derive(Clone, Debug)]
pub struct UserInfo {
    pub id: i64,
    pub is_guest: bool,
    pub is_admin: bool,
    pub name: String,
    pub email: String,
    pub ip: String,
    pub language: String,
    pub permissions: HashSet<String>,
}

impl Default for UserInfo {
    fn default() -> Self {
        Self {
            id: 0,
            is_guest: true,
            is_admin: false,
            name: String::from("Tamu"),
            email: String::new(),
            ip: String::from("127.0.0.1"),
            language: String::from("id_ID"),
            permissions: HashSet::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PortalContext {
    pub scripturl: String,
    pub txt: DataBag,
    pub settings: DataBag,
    pub context: DataBag,
    pub request: RequestVars,
    pub post_vars: RequestVars,
    pub session: DataBag,
    pub user_info: UserInfo,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionCheckMode {
    Get,
    Post,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AchievementRecord {
    pub id: i64,
    pub title: String,
    pub student_name: String,
    pub description: String,
    pub type_id: i64,
    pub achieved_at: Option<DateTime<Utc>>,
    pub image: Option<StoredImage>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AchievementTypeRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct BemProfileRecord {
    pub id: i64,
    pub cabinet_name: String,
    pub period: String,
    pub vision: String,
    pub mission: String,
    pub logo: Option<StoredImage>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct CarouselSlideRecord {
    pub id: i64,
    pub title: String,
    pub image: Option<StoredImage>,
    pub display_order: i32,
    pub active: bool,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ChatbotRuleRecord {
    pub id: i64,
    pub keyword: String,
    pub reply: String,
    pub display_order: i32,
    pub active: bool,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct DirectorRecord {
    pub id: i64,
    pub name: String,
    pub position: String,
    pub photo: Option<StoredImage>,
    pub display_order: i32,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AspirationRecord {
    pub id: i64,
    pub sender_name: String,
    pub email: String,
    pub subject: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Opaque page-link descriptor for server-side pagination. Clients render the
/// label and post back `start`; they never compute offsets themselves.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PageLink {
    pub label: String,
    pub start: usize,
    pub active: bool,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AspirationPage {
    pub start: usize,
    pub total: usize,
    pub unread: usize,
    pub page_links: Vec<PageLink>,
    pub entries: Vec<AspirationRecord>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SeoMetaRecord {
    pub id: i64,
    pub page_key: String,
    pub title: String,
    pub description: String,
    pub keywords: String,
}

#[derive(Clone, Debug, Default)]
pub struct ImageUpload {
    pub name: String,
    pub tmp_path: String,
    pub size: i64,
    pub mime_type: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StoredImage {
    pub id: i64,
    pub path: String,
    pub size: i64,
    pub mime_type: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AdminRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ActionLogEntry {
    pub id: i64,
    pub action: String,
    pub admin_id: Option<i64>,
    pub details: Value,
    pub timestamp: DateTime<Utc>,
}

pub trait PortalService {
    fn check_session(&self, ctx: &PortalContext, mode: SessionCheckMode) -> ServiceResult<()>;
    fn allowed_to(&self, ctx: &PortalContext, permission: &str) -> bool;
    fn log_action(&self, action: &str, admin_id: Option<i64>, details: &Value)
        -> ServiceResult<()>;
    fn list_action_logs(&self) -> ServiceResult<Vec<ActionLogEntry>>;

    fn list_achievements(&self) -> ServiceResult<Vec<AchievementRecord>>;
    fn get_achievement(&self, id: i64) -> ServiceResult<Option<AchievementRecord>>;
    fn save_achievement(&self, record: AchievementRecord) -> ServiceResult<i64>;
    fn delete_achievement(&self, id: i64) -> ServiceResult<()>;

    fn list_achievement_types(&self) -> ServiceResult<Vec<AchievementTypeRecord>>;
    fn save_achievement_type(&self, record: AchievementTypeRecord) -> ServiceResult<i64>;
    fn delete_achievement_type(&self, id: i64) -> ServiceResult<()>;
    fn achievements_with_type(&self, type_id: i64) -> ServiceResult<usize>;

    fn list_bem_profiles(&self) -> ServiceResult<Vec<BemProfileRecord>>;
    fn save_bem_profile(&self, record: BemProfileRecord) -> ServiceResult<i64>;
    fn delete_bem_profile(&self, id: i64) -> ServiceResult<()>;

    fn list_carousel_slides(&self) -> ServiceResult<Vec<CarouselSlideRecord>>;
    fn save_carousel_slide(&self, record: CarouselSlideRecord) -> ServiceResult<i64>;
    fn delete_carousel_slide(&self, id: i64) -> ServiceResult<()>;
    fn set_carousel_active(&self, id: i64, active: bool) -> ServiceResult<()>;

    fn list_chatbot_rules(&self) -> ServiceResult<Vec<ChatbotRuleRecord>>;
    fn save_chatbot_rule(&self, record: ChatbotRuleRecord) -> ServiceResult<i64>;
    fn delete_chatbot_rule(&self, id: i64) -> ServiceResult<()>;
    fn set_chatbot_rule_active(&self, id: i64, active: bool) -> ServiceResult<()>;
    fn chatbot_fallback(&self) -> ServiceResult<String>;
    fn set_chatbot_fallback(&self, reply: &str) -> ServiceResult<()>;

    fn list_directors(&self) -> ServiceResult<Vec<DirectorRecord>>;
    fn save_director(&self, record: DirectorRecord) -> ServiceResult<i64>;
    fn delete_director(&self, id: i64) -> ServiceResult<()>;

    fn aspiration_page(&self, start: usize, limit: usize) -> ServiceResult<AspirationPage>;
    fn submit_aspiration(&self, record: AspirationRecord) -> ServiceResult<i64>;
    fn mark_aspiration_read(&self, id: i64, read: bool) -> ServiceResult<()>;
    fn delete_aspiration(&self, id: i64) -> ServiceResult<()>;

    fn list_seo_meta(&self) -> ServiceResult<Vec<SeoMetaRecord>>;
    fn get_seo_meta(&self, page_key: &str) -> ServiceResult<Option<SeoMetaRecord>>;
    fn save_seo_meta(&self, record: SeoMetaRecord) -> ServiceResult<i64>;
    fn delete_seo_meta(&self, id: i64) -> ServiceResult<()>;

    fn store_image(&self, upload: ImageUpload) -> ServiceResult<StoredImage>;
    fn delete_image(&self, id: i64) -> ServiceResult<()>;

    fn find_admin_by_email(&self, email: &str) -> ServiceResult<Option<AdminRecord>>;
    fn get_admin(&self, id: i64) -> ServiceResult<Option<AdminRecord>>;
    fn update_admin_password(&self, admin_id: i64, password_hash: &str) -> ServiceResult<()>;
    fn reset_secret(&self) -> ServiceResult<String>;
}

#[derive(Default)]
struct InMemoryState {
    achievements: HashMap<i64, AchievementRecord>,
    next_achievement_id: i64,
    achievement_types: HashMap<i64, AchievementTypeRecord>,
    next_type_id: i64,
    bem_profiles: HashMap<i64, BemProfileRecord>,
    next_bem_id: i64,
    carousel: HashMap<i64, CarouselSlideRecord>,
    next_slide_id: i64,
    chatbot_rules: HashMap<i64, ChatbotRuleRecord>,
    next_rule_id: i64,
    chatbot_fallback: String,
    directors: HashMap<i64, DirectorRecord>,
    next_director_id: i64,
    aspirations: Vec<AspirationRecord>,
    next_aspiration_id: i64,
    seo_meta: HashMap<i64, SeoMetaRecord>,
    next_meta_id: i64,
    images: HashMap<i64, StoredImage>,
    next_image_id: i64,
    admins: HashMap<i64, AdminRecord>,
    reset_secret: String,
    action_logs: Vec<ActionLogEntry>,
    next_action_log_id: i64,
}

#[derive(Clone)]
pub struct InMemoryService {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryService {
    pub fn new_with_sample() -> Self {
        let mut state = InMemoryState::default();
        state.achievement_types.insert(
            1,
            AchievementTypeRecord {
                id: 1,
                name: "Akademik".into(),
                description: "Lomba dan kompetisi bidang akademik".into(),
            },
        );
        state.achievement_types.insert(
            2,
            AchievementTypeRecord {
                id: 2,
                name: "Non-Akademik".into(),
                description: "Olahraga, seni, dan minat bakat".into(),
            },
        );
        state.next_type_id = 3;
        state.achievements.insert(
            1,
            AchievementRecord {
                id: 1,
                title: "Juara 1 Lomba Karya Tulis Ilmiah Nasional".into(),
                student_name: "Siti Rahayu".into(),
                description: "Diselenggarakan oleh Kemendikbudristek".into(),
                type_id: 1,
                achieved_at: Some(Utc::now() - Duration::days(30)),
                image: None,
            },
        );
        state.achievements.insert(
            2,
            AchievementRecord {
                id: 2,
                title: "Medali Perak Pekan Olahraga Mahasiswa".into(),
                student_name: "Budi Santoso".into(),
                description: "Cabang bulu tangkis tunggal putra".into(),
                type_id: 2,
                achieved_at: Some(Utc::now() - Duration::days(10)),
                image: None,
            },
        );
        state.next_achievement_id = 3;
        state.bem_profiles.insert(
            1,
            BemProfileRecord {
                id: 1,
                cabinet_name: "Kabinet Harmoni Karya".into(),
                period: "2024/2025".into(),
                vision: "Mewujudkan mahasiswa yang kolaboratif dan berdampak".into(),
                mission: "Menghidupkan ruang aspirasi dan pengembangan minat bakat".into(),
                logo: None,
            },
        );
        state.next_bem_id = 2;
        state.images.insert(
            1,
            StoredImage {
                id: 1,
                path: "/uploads/carousel/pmb.jpg".into(),
                size: 150_000,
                mime_type: "image/jpeg".into(),
            },
        );
        state.next_image_id = 2;
        state.carousel.insert(
            1,
            CarouselSlideRecord {
                id: 1,
                title: "Penyambutan Mahasiswa Baru".into(),
                image: state.images.get(&1).cloned(),
                display_order: 1,
                active: true,
            },
        );
        state.carousel.insert(
            2,
            CarouselSlideRecord {
                id: 2,
                title: "Pekan Kreativitas Mahasiswa".into(),
                image: None,
                display_order: 2,
                active: false,
            },
        );
        state.next_slide_id = 3;
        state.chatbot_rules.insert(
            1,
            ChatbotRuleRecord {
                id: 1,
                keyword: "beasiswa".into(),
                reply: "Informasi beasiswa tersedia di menu Layanan > Beasiswa.".into(),
                display_order: 1,
                active: true,
            },
        );
        state.chatbot_rules.insert(
            2,
            ChatbotRuleRecord {
                id: 2,
                keyword: "ukm".into(),
                reply: "Daftar UKM dapat dilihat pada halaman Organisasi.".into(),
                display_order: 2,
                active: true,
            },
        );
        state.next_rule_id = 3;
        state.chatbot_fallback =
            "Maaf, pertanyaan belum dapat dijawab. Silakan hubungi bagian Kemahasiswaan.".into();
        state.directors.insert(
            1,
            DirectorRecord {
                id: 1,
                name: "Dr. Andi Wijaya, M.Pd.".into(),
                position: "Direktur Kemahasiswaan".into(),
                photo: None,
                display_order: 1,
            },
        );
        state.directors.insert(
            2,
            DirectorRecord {
                id: 2,
                name: "Rina Kusuma, S.T., M.T.".into(),
                position: "Kepala Bagian Minat dan Bakat".into(),
                photo: None,
                display_order: 2,
            },
        );
        state.next_director_id = 3;
        state.aspirations = (1..=7)
            .map(|n| AspirationRecord {
                id: n,
                sender_name: format!("Mahasiswa {n}"),
                email: format!("mhs{n}@kampus.ac.id"),
                subject: format!("Aspirasi ke-{n}"),
                body: "Mohon perbaikan fasilitas ruang sekretariat UKM.".into(),
                is_read: n <= 2,
                created_at: Some(Utc::now() - Duration::days(7 - n)),
            })
            .collect();
        state.next_aspiration_id = 8;
        state.seo_meta.insert(
            1,
            SeoMetaRecord {
                id: 1,
                page_key: "beranda".into(),
                title: "Kemahasiswaan | Beranda".into(),
                description: "Portal layanan kemahasiswaan universitas".into(),
                keywords: "kemahasiswaan, prestasi, beasiswa".into(),
            },
        );
        state.next_meta_id = 2;
        state.admins.insert(
            1,
            AdminRecord {
                id: 1,
                name: "Admin Kemahasiswaan".into(),
                email: "admin@kampus.ac.id".into(),
                password: "rahasia123".into(),
            },
        );
        state.reset_secret = "reset_secret_key".into();
        state.next_action_log_id = 1;
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn assign_id(next: &mut i64) -> i64 {
        let id = *next;
        *next += 1;
        id
    }
}

impl Default for InMemoryService {
    fn default() -> Self {
        Self::new_with_sample()
    }
}

impl PortalService for InMemoryService {
    fn check_session(&self, ctx: &PortalContext, _mode: SessionCheckMode) -> ServiceResult<()> {
        if ctx.session.bool("force_timeout") {
            Err(PortalError::SessionTimeout)
        } else {
            Ok(())
        }
    }

    fn allowed_to(&self, ctx: &PortalContext, permission: &str) -> bool {
        ctx.user_info.is_admin || ctx.user_info.permissions.contains(permission)
    }

    fn log_action(
        &self,
        action: &str,
        admin_id: Option<i64>,
        details: &Value,
    ) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        let id = Self::assign_id(&mut state.next_action_log_id);
        state.action_logs.push(ActionLogEntry {
            id,
            action: action.to_string(),
            admin_id,
            details: details.clone(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    fn list_action_logs(&self) -> ServiceResult<Vec<ActionLogEntry>> {
        let state = self.state.lock().unwrap();
        Ok(state.action_logs.clone())
    }

    fn list_achievements(&self) -> ServiceResult<Vec<AchievementRecord>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<_> = state.achievements.values().cloned().collect();
        rows.sort_by_key(|row| row.id);
        Ok(rows)
    }

    fn get_achievement(&self, id: i64) -> ServiceResult<Option<AchievementRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state.achievements.get(&id).cloned())
    }

    fn save_achievement(&self, mut record: AchievementRecord) -> ServiceResult<i64> {
        let mut state = self.state.lock().unwrap();
        if !state.achievement_types.contains_key(&record.type_id) {
            return Err(PortalError::invalid("type_id", "unknown achievement type"));
        }
        if record.id == 0 {
            record.id = Self::assign_id(&mut state.next_achievement_id);
        }
        let id = record.id;
        state.achievements.insert(id, record);
        Ok(id)
    }

    fn delete_achievement(&self, id: i64) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .achievements
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortalError::NotFound(format!("achievement {id}")))
    }

    fn list_achievement_types(&self) -> ServiceResult<Vec<AchievementTypeRecord>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<_> = state.achievement_types.values().cloned().collect();
        rows.sort_by_key(|row| row.id);
        Ok(rows)
    }

    fn save_achievement_type(&self, mut record: AchievementTypeRecord) -> ServiceResult<i64> {
        let mut state = self.state.lock().unwrap();
        if record.id == 0 {
            record.id = Self::assign_id(&mut state.next_type_id);
        }
        let id = record.id;
        state.achievement_types.insert(id, record);
        Ok(id)
    }

    fn delete_achievement_type(&self, id: i64) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        let in_use = state
            .achievements
            .values()
            .any(|achievement| achievement.type_id == id);
        if in_use {
            return Err(PortalError::invalid(
                "type_id",
                "type is still referenced by achievements",
            ));
        }
        state
            .achievement_types
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortalError::NotFound(format!("achievement type {id}")))
    }

    fn achievements_with_type(&self, type_id: i64) -> ServiceResult<usize> {
        let state = self.state.lock().unwrap();
        Ok(state
            .achievements
            .values()
            .filter(|achievement| achievement.type_id == type_id)
            .count())
    }

    fn list_bem_profiles(&self) -> ServiceResult<Vec<BemProfileRecord>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<_> = state.bem_profiles.values().cloned().collect();
        rows.sort_by(|a, b| b.period.cmp(&a.period).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    fn save_bem_profile(&self, mut record: BemProfileRecord) -> ServiceResult<i64> {
        let mut state = self.state.lock().unwrap();
        let duplicate = state
            .bem_profiles
            .values()
            .any(|profile| profile.period == record.period && profile.id != record.id);
        if duplicate {
            return Err(PortalError::invalid(
                "period",
                "a profile for this period already exists",
            ));
        }
        if record.id == 0 {
            record.id = Self::assign_id(&mut state.next_bem_id);
        }
        let id = record.id;
        state.bem_profiles.insert(id, record);
        Ok(id)
    }

    fn delete_bem_profile(&self, id: i64) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .bem_profiles
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortalError::NotFound(format!("bem profile {id}")))
    }

    fn list_carousel_slides(&self) -> ServiceResult<Vec<CarouselSlideRecord>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<_> = state.carousel.values().cloned().collect();
        rows.sort_by(|a, b| a.display_order.cmp(&b.display_order).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    fn save_carousel_slide(&self, mut record: CarouselSlideRecord) -> ServiceResult<i64> {
        let mut state = self.state.lock().unwrap();
        if record.id == 0 {
            record.id = Self::assign_id(&mut state.next_slide_id);
        }
        let id = record.id;
        state.carousel.insert(id, record);
        Ok(id)
    }

    fn delete_carousel_slide(&self, id: i64) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .carousel
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortalError::NotFound(format!("carousel slide {id}")))
    }

    fn set_carousel_active(&self, id: i64, active: bool) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.carousel.get_mut(&id) {
            Some(slide) => {
                slide.active = active;
                Ok(())
            }
            None => Err(PortalError::NotFound(format!("carousel slide {id}"))),
        }
    }

    fn list_chatbot_rules(&self) -> ServiceResult<Vec<ChatbotRuleRecord>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<_> = state.chatbot_rules.values().cloned().collect();
        rows.sort_by(|a, b| a.display_order.cmp(&b.display_order).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    fn save_chatbot_rule(&self, mut record: ChatbotRuleRecord) -> ServiceResult<i64> {
        let mut state = self.state.lock().unwrap();
        if record.id == 0 {
            record.id = Self::assign_id(&mut state.next_rule_id);
        }
        let id = record.id;
        state.chatbot_rules.insert(id, record);
        Ok(id)
    }

    fn delete_chatbot_rule(&self, id: i64) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .chatbot_rules
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortalError::NotFound(format!("chatbot rule {id}")))
    }

    fn set_chatbot_rule_active(&self, id: i64, active: bool) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.chatbot_rules.get_mut(&id) {
            Some(rule) => {
                rule.active = active;
                Ok(())
            }
            None => Err(PortalError::NotFound(format!("chatbot rule {id}"))),
        }
    }

    fn chatbot_fallback(&self) -> ServiceResult<String> {
        let state = self.state.lock().unwrap();
        Ok(state.chatbot_fallback.clone())
    }

    fn set_chatbot_fallback(&self, reply: &str) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        state.chatbot_fallback = reply.to_string();
        Ok(())
    }

    fn list_directors(&self) -> ServiceResult<Vec<DirectorRecord>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<_> = state.directors.values().cloned().collect();
        rows.sort_by(|a, b| a.display_order.cmp(&b.display_order).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    fn save_director(&self, mut record: DirectorRecord) -> ServiceResult<i64> {
        let mut state = self.state.lock().unwrap();
        if record.id == 0 {
            record.id = Self::assign_id(&mut state.next_director_id);
        }
        let id = record.id;
        state.directors.insert(id, record);
        Ok(id)
    }

    fn delete_director(&self, id: i64) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .directors
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortalError::NotFound(format!("director {id}")))
    }

    fn aspiration_page(&self, start: usize, limit: usize) -> ServiceResult<AspirationPage> {
        let state = self.state.lock().unwrap();
        let mut entries = state.aspirations.clone();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        let total = entries.len();
        let unread = entries.iter().filter(|row| !row.is_read).count();
        let limit = limit.max(1);
        let start = if total == 0 { 0 } else { start.min(total - 1) };
        let page: Vec<_> = entries.into_iter().skip(start).take(limit).collect();
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
            entries: page,
        })
    }

    fn submit_aspiration(&self, mut record: AspirationRecord) -> ServiceResult<i64> {
        let mut state = self.state.lock().unwrap();
        if record.id == 0 {
            record.id = Self::assign_id(&mut state.next_aspiration_id);
        }
        if record.created_at.is_none() {
            record.created_at = Some(Utc::now());
        }
        let id = record.id;
        state.aspirations.push(record);
        Ok(id)
    }

    fn mark_aspiration_read(&self, id: i64, read: bool) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.aspirations.iter_mut().find(|row| row.id == id) {
            Some(row) => {
                row.is_read = read;
                Ok(())
            }
            None => Err(PortalError::NotFound(format!("aspiration {id}"))),
        }
    }

    fn delete_aspiration(&self, id: i64) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.aspirations.len();
        state.aspirations.retain(|row| row.id != id);
        if state.aspirations.len() == before {
            return Err(PortalError::NotFound(format!("aspiration {id}")));
        }
        Ok(())
    }

    fn list_seo_meta(&self) -> ServiceResult<Vec<SeoMetaRecord>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<_> = state.seo_meta.values().cloned().collect();
        rows.sort_by_key(|row| row.id);
        Ok(rows)
    }

    fn get_seo_meta(&self, page_key: &str) -> ServiceResult<Option<SeoMetaRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .seo_meta
            .values()
            .find(|meta| meta.page_key == page_key)
            .cloned())
    }

    fn save_seo_meta(&self, mut record: SeoMetaRecord) -> ServiceResult<i64> {
        let mut state = self.state.lock().unwrap();
        let duplicate = state
            .seo_meta
            .values()
            .any(|meta| meta.page_key == record.page_key && meta.id != record.id);
        if duplicate {
            return Err(PortalError::invalid("page_key", "page key is already in use"));
        }
        if record.id == 0 {
            record.id = Self::assign_id(&mut state.next_meta_id);
        }
        let id = record.id;
        state.seo_meta.insert(id, record);
        Ok(id)
    }

    fn delete_seo_meta(&self, id: i64) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .seo_meta
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortalError::NotFound(format!("seo meta {id}")))
    }

    fn store_image(&self, upload: ImageUpload) -> ServiceResult<StoredImage> {
        let mut state = self.state.lock().unwrap();
        let id = Self::assign_id(&mut state.next_image_id);
        let stored = StoredImage {
            id,
            path: format!("/uploads/{}", upload.name),
            size: upload.size,
            mime_type: upload.mime_type,
        };
        state.images.insert(id, stored.clone());
        Ok(stored)
    }

    fn delete_image(&self, id: i64) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        state.images.remove(&id);
        Ok(())
    }

    fn find_admin_by_email(&self, email: &str) -> ServiceResult<Option<AdminRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .admins
            .values()
            .find(|admin| admin.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn get_admin(&self, id: i64) -> ServiceResult<Option<AdminRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state.admins.get(&id).cloned())
    }

    fn update_admin_password(&self, admin_id: i64, password_hash: &str) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.admins.get_mut(&admin_id) {
            Some(admin) => {
                admin.password = password_hash.to_string();
                Ok(())
            }
            None => Err(PortalError::NotFound(format!("admin {admin_id}"))),
        }
    }

    fn reset_secret(&self) -> ServiceResult<String> {
        let state = self.state.lock().unwrap();
        Ok(state.reset_secret.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_data_is_seeded() {
        let service = InMemoryService::default();
        assert_eq!(service.list_achievements().unwrap().len(), 2);
        assert_eq!(service.list_achievement_types().unwrap().len(), 2);
        assert_eq!(service.aspiration_page(0, 5).unwrap().total, 7);
    }

    #[test]
    fn save_assigns_ids() {
        let service = InMemoryService::default();
        let id = service
            .save_achievement(AchievementRecord {
                id: 0,
                title: "Juara Harapan Debat Bahasa Inggris".into(),
                student_name: "Dewi Lestari".into(),
                description: String::new(),
                type_id: 1,
                achieved_at: Some(Utc::now()),
                image: None,
            })
            .unwrap();
        assert!(id >= 3);
        assert!(service.get_achievement(id).unwrap().is_some());
    }

    #[test]
    fn achievement_requires_known_type() {
        let service = InMemoryService::default();
        let result = service.save_achievement(AchievementRecord {
            type_id: 99,
            ..AchievementRecord::default()
        });
        assert!(matches!(result, Err(PortalError::Validation(_))));
    }

    #[test]
    fn type_in_use_refuses_delete() {
        let service = InMemoryService::default();
        assert!(service.delete_achievement_type(1).is_err());
        service.delete_achievement(1).unwrap();
        assert_eq!(service.achievements_with_type(1).unwrap(), 0);
        service.delete_achievement_type(1).unwrap();
    }

    #[test]
    fn duplicate_period_rejected() {
        let service = InMemoryService::default();
        let result = service.save_bem_profile(BemProfileRecord {
            id: 0,
            cabinet_name: "Kabinet Baru".into(),
            period: "2024/2025".into(),
            vision: String::new(),
            mission: String::new(),
            logo: None,
        });
        assert!(matches!(result, Err(PortalError::Validation(_))));
    }

    #[test]
    fn aspiration_pagination_links() {
        let service = InMemoryService::default();
        let page = service.aspiration_page(3, 3).unwrap();
        assert_eq!(page.total, 7);
        assert_eq!(page.entries.len(), 3);
        assert_eq!(page.page_links.len(), 3);
        assert!(page.page_links[1].active);
        assert!(!page.page_links[0].active);
    }

    #[test]
    fn field_errors_format_in_order() {
        let mut errors = FieldErrors::new();
        errors.push("title", "wajib diisi");
        errors.push("image", "terlalu besar");
        assert_eq!(
            errors.to_string(),
            "image: terlalu besar; title: wajib diisi"
        );
    }
}
