use serde_json::Value;
use std::fmt::Write;

/// Render an admin grid from context rows. Columns name the JSON keys to show;
/// every row gets edit/delete action buttons keyed by its id.
pub fn render_listing(rows: &[Value], columns: &[(&str, &str)]) -> String {
    let mut html = String::from("<table class=\"resource-list\"><thead><tr>");
    for (_, label) in columns {
        write!(html, "<th>{label}</th>").ok();
    }
    html.push_str("<th></th></tr></thead><tbody>");
    if rows.is_empty() {
        writeln!(
            html,
            "<tr><td colspan=\"{}\" class=\"empty\">Belum ada data</td></tr>",
            columns.len() + 1
        )
        .ok();
    }
    for row in rows {
        let id = row.get("id").and_then(Value::as_i64).unwrap_or(0);
        html.push_str("<tr>");
        for (key, _) in columns {
            let cell = match row.get(*key) {
                Some(Value::String(text)) => text.clone(),
                Some(Value::Bool(true)) => "Aktif".into(),
                Some(Value::Bool(false)) => "Nonaktif".into(),
                Some(other) if !other.is_null() => other.to_string(),
                _ => String::new(),
            };
            write!(html, "<td>{}</td>", escape(&cell)).ok();
        }
        write!(
            html,
            "<td class=\"actions\"><button data-edit=\"{id}\">Ubah</button><button data-delete=\"{id}\">Hapus</button></td>"
        )
        .ok();
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
