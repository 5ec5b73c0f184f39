use chrono::Utc;
use kemahasiswaan_portal::auth_ops::validate_login;
use kemahasiswaan_portal::chatbot;
use kemahasiswaan_portal::controller::resource_list::ResourceListController;
use kemahasiswaan_portal::gateway::SubmitSpec;
use kemahasiswaan_portal::manage_achievements;
use kemahasiswaan_portal::manage_aspirations;
use kemahasiswaan_portal::services::{InMemoryService, PortalContext, PortalService};
use kemahasiswaan_portal::templates::banner_template::render_banner;

fn main() {
    let service = InMemoryService::default();

    let mut ctx = PortalContext::default();
    if let Err(error) = validate_login(&service, &mut ctx, "admin@kampus.ac.id", "rahasia123") {
        eprintln!("login -> {error}");
        return;
    }

    if let Err(error) = manage_achievements::list_achievements(&service, &mut ctx) {
        eprintln!("list_achievements -> {error}");
    }
    println!(
        "prestasi terdaftar: {}",
        ctx.context.int("achievement_total").unwrap_or(0)
    );

    let mut public_ctx = PortalContext::default();
    public_ctx.post_vars.set("sender_name", "Mahasiswa Demo");
    public_ctx.post_vars.set("email", "demo@kampus.ac.id");
    public_ctx.post_vars.set("subject", "Contoh aspirasi");
    public_ctx
        .post_vars
        .set("body", "Mohon penambahan ruang belajar bersama.");
    match manage_aspirations::submit_aspiration(&service, &mut public_ctx) {
        Ok(id) => println!("aspirasi terkirim dengan id {id}"),
        Err(error) => eprintln!("submit_aspiration -> {error}"),
    }

    if let Ok(reply) = chatbot::respond(&service, "Bagaimana info beasiswa?") {
        println!("chatbot: {reply}");
    }

    // Delete flow through the shared list controller: open the confirmation,
    // confirm, and let the banner report the outcome.
    let mut list = ResourceListController::new();
    list.load(service.list_achievements().unwrap_or_default());
    list.request_delete(2);
    let spec = SubmitSpec::new("achievements.destroy", "Prestasi berhasil dihapus");
    let now = Utc::now();
    list.confirm_delete(
        &spec,
        now,
        |id| manage_achievements::destroy_achievement(&service, &mut ctx, id),
        || service.list_achievements(),
    );
    println!("{}", render_banner(&list.banner));
    println!("sisa prestasi: {}", list.len());
}
