use crate::services::PortalContext;

pub fn apply_language(ctx: &mut PortalContext, pack: &str) {
    let lang = ActiveLanguage::detect(ctx);
    match pack {
        "ManageResources" => load_manage_resources(ctx, lang),
        "Auth" => load_auth_strings(ctx, lang),
        "index" => load_index_strings(ctx, lang),
        _ => {}
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ActiveLanguage {
    Indonesian,
    English,
}

impl ActiveLanguage {
    fn detect(ctx: &PortalContext) -> Self {
        Self::from_code(ctx.user_info.language.as_str())
    }

    fn from_code(code: &str) -> Self {
        let normalized = code.trim().to_ascii_lowercase();
        if normalized.starts_with("en") || normalized.contains("english") {
            Self::English
        } else {
            Self::Indonesian
        }
    }

    fn pick<'a>(&self, indonesian: &'a str, english: &'a str) -> &'a str {
        match self {
            ActiveLanguage::Indonesian => indonesian,
            ActiveLanguage::English => english,
        }
    }
}

fn load_manage_resources(ctx: &mut PortalContext, lang: ActiveLanguage) {
    ctx.txt
        .set("saved", lang.pick("Data berhasil disimpan", "Data saved"));
    ctx.txt
        .set("deleted", lang.pick("Data berhasil dihapus", "Data deleted"));
    ctx.txt.set(
        "delete_confirm",
        lang.pick(
            "Yakin ingin menghapus data ini? Tindakan tidak dapat dibatalkan.",
            "Delete this record? This cannot be undone.",
        ),
    );
    ctx.txt.set(
        "type_in_use",
        lang.pick(
            "Jenis prestasi masih dipakai dan tidak dapat dihapus",
            "Achievement type is still in use and cannot be deleted",
        ),
    );
    ctx.txt
        .set("search_placeholder", lang.pick("Cari...", "Search..."));
}

fn load_auth_strings(ctx: &mut PortalContext, lang: ActiveLanguage) {
    ctx.txt.set(
        "login_failed",
        lang.pick("Email atau kata sandi salah", "Wrong email or password"),
    );
    ctx.txt.set(
        "reset_sent",
        lang.pick(
            "Tautan atur ulang kata sandi telah dikirim ke email Anda",
            "A password reset link has been sent to your email",
        ),
    );
    ctx.txt.set(
        "reset_invalid",
        lang.pick(
            "Tautan atur ulang tidak valid atau sudah kedaluwarsa",
            "The reset link is invalid or has expired",
        ),
    );
}

fn load_index_strings(ctx: &mut PortalContext, lang: ActiveLanguage) {
    ctx.txt
        .set("achievements", lang.pick("Prestasi", "Achievements"));
    ctx.txt
        .set("aspirations", lang.pick("Aspirasi", "Aspirations"));
    ctx.txt
        .set("directors", lang.pick("Pimpinan", "Directors"));
    ctx.txt
        .set("carousel", lang.pick("Banner Beranda", "Home Banners"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indonesian_is_the_default() {
        let mut ctx = PortalContext::default();
        apply_language(&mut ctx, "ManageResources");
        assert_eq!(
            ctx.txt.string("saved").as_deref(),
            Some("Data berhasil disimpan")
        );
    }

    #[test]
    fn respects_user_language_preference() {
        let mut ctx = PortalContext::default();
        ctx.user_info.language = "en_US".into();
        apply_language(&mut ctx, "Auth");
        assert_eq!(
            ctx.txt.string("login_failed").as_deref(),
            Some("Wrong email or password")
        );
    }

    #[test]
    fn language_detection_handles_codes() {
        assert_eq!(ActiveLanguage::from_code("en"), ActiveLanguage::English);
        assert_eq!(ActiveLanguage::from_code("id_ID"), ActiveLanguage::Indonesian);
        assert_eq!(ActiveLanguage::from_code(""), ActiveLanguage::Indonesian);
    }
}
