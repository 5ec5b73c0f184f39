use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use reqwasm::http::Request;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

fn main() {
    launch(App);
}

// ---------- Types ----------
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
struct Achievement {
    id: i64,
    title: String,
    student_name: String,
    #[serde(rename = "type")]
    type_name: Option<String>,
    achieved_at: Option<String>,
}

#[derive(Deserialize)]
struct AchievementListResponse { status: String, achievements: Vec<Achievement>, total: Option<i64> }
#[derive(Deserialize)]
struct MutationResponse { status: String, id: Option<i64> }
#[derive(Deserialize)]
struct AuthResponse { status: String, token: String, admin: AdminInfo }
#[derive(Clone, Deserialize)]
struct AdminInfo { id: i64, name: String }

#[derive(Serialize)]
struct LoginPayload { email: String, password: String }
#[derive(Serialize)]
struct AchievementPayload { title: String, student_name: String, description: String, type_id: i64, achieved_at: String }

#[derive(Clone, Copy, PartialEq)]
enum BannerKind { Success, Error }

// ---------- Utilities ----------
fn window() -> Option<web_sys::Window> { web_sys::window() }
fn save_token_to_storage(token: &str) { if let Some(win) = window() { if let Ok(Some(storage)) = win.local_storage() { let _ = storage.set_item("portal_token", token); } } }
fn load_token_from_storage() -> Option<String> { window().and_then(|win| win.local_storage().ok().flatten()).and_then(|s| s.get_item("portal_token").ok().flatten()) }

async fn get_json<T: DeserializeOwned>(base: &str, path: &str, token: &str) -> Result<T, String> {
    let url = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    let mut req = Request::get(&url);
    if !token.trim().is_empty() { req = req.header("Authorization", &format!("Bearer {}", token)); }
    let resp = req.send().await.map_err(|e| format!("kesalahan jaringan: {e}"))?;
    let status = resp.status();
    let text = resp.text().await.map_err(|e| format!("gagal membaca respons: {e}"))?;
    if !resp.ok() { return Err(format!("HTTP {status}: {text}")); }
    serde_json::from_str(&text).map_err(|e| format!("gagal mengurai: {e}"))
}

async fn send_json<T: DeserializeOwned, B: Serialize>(method: &str, base: &str, path: &str, token: &str, body: Option<&B>) -> Result<T, String> {
    let url = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    let mut req = match method {
        "DELETE" => Request::delete(&url),
        _ => Request::post(&url),
    };
    if !token.trim().is_empty() { req = req.header("Authorization", &format!("Bearer {}", token)); }
    if let Some(body) = body {
        req = req.header("Content-Type", "application/json").body(serde_json::to_string(body).unwrap());
    }
    let resp = req.send().await.map_err(|e| format!("kesalahan jaringan: {e}"))?;
    let status = resp.status();
    let text = resp.text().await.map_err(|e| format!("gagal membaca respons: {e}"))?;
    if !resp.ok() { return Err(format!("HTTP {status}: {text}")); }
    serde_json::from_str(&text).map_err(|e| format!("gagal mengurai: {e}"))
}

// ---------- App ----------
fn App() -> Element {
    let api_base = use_signal(|| "http://127.0.0.1:3000".to_string());
    let mut token = use_signal(|| load_token_from_storage().unwrap_or_default());
    let mut admin_name = use_signal(String::new);
    let mut login_email = use_signal(|| "".to_string());
    let mut login_password = use_signal(|| "".to_string());

    let mut achievements = use_signal(Vec::<Achievement>::new);
    let mut search = use_signal(|| "".to_string());
    let mut direction = use_signal(|| "desc".to_string());

    // Banner state: one message at a time, auto-dismiss after 5 s.
    let mut banner = use_signal(|| Option::<(BannerKind, String, u32)>::None);
    let mut banner_seq = use_signal(|| 0u32);
    // Delete confirmation: holds the target id; confirm is disabled in flight.
    let mut confirm_target = use_signal(|| Option::<i64>::None);
    let mut deleting = use_signal(|| false);

    let mut new_title = use_signal(|| "".to_string());
    let mut new_student = use_signal(|| "".to_string());
    let mut new_date = use_signal(|| "".to_string());
    let mut field_errors = use_signal(Vec::<String>::new);

    let mut show_banner = move |kind: BannerKind, message: String| {
        let seq = banner_seq() + 1;
        banner_seq.set(seq);
        banner.set(Some((kind, message, seq)));
        spawn(async move {
            TimeoutFuture::new(5000).await;
            // Only hide if no newer banner replaced this one meanwhile.
            if banner().map(|(_, _, s)| s) == Some(seq) {
                banner.set(None);
            }
        });
    };

    let login = move || {
        let base = api_base();
        let email = login_email();
        let pass = login_password();
        if email.is_empty() || pass.is_empty() {
            show_banner(BannerKind::Error, "Masukkan email dan kata sandi".into());
            return;
        }
        spawn(async move {
            let payload = LoginPayload { email, password: pass };
            match send_json::<AuthResponse, _>("POST", &base, "/auth/login", "", Some(&payload)).await {
                Ok(resp) => {
                    save_token_to_storage(&resp.token);
                    token.set(resp.token);
                    admin_name.set(resp.admin.name.clone());
                    show_banner(BannerKind::Success, format!("Selamat datang, {}", resp.admin.name));
                }
                Err(err) => show_banner(BannerKind::Error, format!("Gagal masuk: {err}")),
            }
        });
    };

    let load_achievements = move || {
        let base = api_base();
        let jwt = token();
        let query = search();
        let dir = direction();
        spawn(async move {
            let path = format!("/api/achievements?search={}&direction={}", query, dir);
            match get_json::<AchievementListResponse>(&base, &path, &jwt).await {
                Ok(resp) => achievements.set(resp.achievements),
                Err(err) => show_banner(BannerKind::Error, format!("Gagal memuat prestasi: {err}")),
            }
        });
    };

    let store_achievement = move || {
        let base = api_base();
        let jwt = token();
        let payload = AchievementPayload {
            title: new_title(),
            student_name: new_student(),
            description: String::new(),
            type_id: 1,
            achieved_at: new_date(),
        };
        spawn(async move {
            field_errors.set(Vec::new());
            match send_json::<MutationResponse, _>("POST", &base, "/api/achievements", &jwt, Some(&payload)).await {
                Ok(_) => {
                    new_title.set(String::new());
                    new_student.set(String::new());
                    new_date.set(String::new());
                    show_banner(BannerKind::Success, "Prestasi berhasil disimpan".into());
                    load_achievements();
                }
                Err(err) => {
                    // 422 bodies carry field-keyed errors; surface them inline.
                    if err.contains("422") {
                        field_errors.set(err.split(';').map(|s| s.trim().to_string()).collect());
                    } else {
                        show_banner(BannerKind::Error, format!("Gagal menyimpan: {err}"));
                    }
                }
            }
        });
    };

    let confirm_delete = move || {
        if deleting() { return; }
        let Some(id) = confirm_target() else { return; };
        let base = api_base();
        let jwt = token();
        deleting.set(true);
        spawn(async move {
            let path = format!("/api/achievements/{}", id);
            match send_json::<MutationResponse, ()>("DELETE", &base, &path, &jwt, None).await {
                Ok(_) => {
                    show_banner(BannerKind::Success, "Prestasi berhasil dihapus".into());
                    load_achievements();
                }
                Err(err) => show_banner(BannerKind::Error, format!("Gagal menghapus: {err}")),
            }
            deleting.set(false);
            confirm_target.set(None);
        });
    };

    rsx! {
        div { class: "portal-admin",
            h1 { "Admin Kemahasiswaan" }
            if let Some((kind, message, _)) = banner() {
                div {
                    class: if kind == BannerKind::Success { "banner banner-success" } else { "banner banner-error" },
                    span { "{message}" }
                    button { onclick: move |_| banner.set(None), "×" }
                }
            }
            if token().is_empty() {
                div { class: "login-card",
                    h2 { "Masuk" }
                    input { placeholder: "Email", value: "{login_email}", oninput: move |e| login_email.set(e.value()) }
                    input { r#type: "password", placeholder: "Kata sandi", value: "{login_password}", oninput: move |e| login_password.set(e.value()) }
                    button { onclick: move |_| login(), "Masuk" }
                }
            } else {
                div { class: "toolbar",
                    span { "Masuk sebagai {admin_name}" }
                    input {
                        placeholder: "Cari judul atau nama mahasiswa...",
                        value: "{search}",
                        oninput: move |e| { search.set(e.value()); load_achievements(); }
                    }
                    button {
                        onclick: move |_| {
                            direction.set(if direction() == "desc" { "asc".into() } else { "desc".into() });
                            load_achievements();
                        },
                        if direction() == "desc" { "Terbaru dulu ▼" } else { "Terlama dulu ▲" }
                    }
                    button { onclick: move |_| load_achievements(), "Muat ulang" }
                }
                div { class: "create-card",
                    h3 { "Tambah Prestasi" }
                    input { placeholder: "Judul", value: "{new_title}", oninput: move |e| new_title.set(e.value()) }
                    input { placeholder: "Nama mahasiswa", value: "{new_student}", oninput: move |e| new_student.set(e.value()) }
                    input { r#type: "date", value: "{new_date}", oninput: move |e| new_date.set(e.value()) }
                    for err in field_errors() {
                        p { class: "field-error", "{err}" }
                    }
                    button { onclick: move |_| store_achievement(), "Simpan" }
                }
                table { class: "resource-list",
                    thead { tr { th { "Judul" } th { "Mahasiswa" } th { "Jenis" } th { "Tanggal" } th { "" } } }
                    tbody {
                        for row in achievements() {
                            tr { key: "{row.id}",
                                td { "{row.title}" }
                                td { "{row.student_name}" }
                                td { {row.type_name.clone().unwrap_or_default()} }
                                td { {row.achieved_at.clone().unwrap_or_default()} }
                                td {
                                    button {
                                        onclick: move |_| confirm_target.set(Some(row.id)),
                                        "Hapus"
                                    }
                                }
                            }
                        }
                    }
                }
                if let Some(id) = confirm_target() {
                    div { class: "modal-backdrop",
                        div { class: "modal",
                            p { "Yakin ingin menghapus data #{id}? Tindakan tidak dapat dibatalkan." }
                            div { class: "modal-actions",
                                button { onclick: move |_| confirm_target.set(None), "Batal" }
                                button {
                                    disabled: deleting(),
                                    onclick: move |_| confirm_delete(),
                                    if deleting() { "Menghapus..." } else { "Hapus" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
