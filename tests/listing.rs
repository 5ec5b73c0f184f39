use kemahasiswaan_portal::listing::{apply, filter_rows, SortDirection};
use kemahasiswaan_portal::services::{InMemoryService, PortalService};

#[test]
fn empty_query_returns_the_full_list() {
    let service = InMemoryService::new_with_sample();
    let rows = service.list_achievements().unwrap();
    let filtered = filter_rows(&rows, "");
    assert_eq!(filtered.len(), rows.len());
}

#[test]
fn query_matches_any_searchable_field_case_insensitively() {
    let service = InMemoryService::new_with_sample();
    let rows = service.list_achievements().unwrap();
    // Matches the student name field, not the title.
    let filtered = filter_rows(&rows, "bUdI");
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].student_name, "Budi Santoso");
}

#[test]
fn ascending_then_descending_is_a_reversal() {
    let service = InMemoryService::new_with_sample();
    let rows = service.list_achievements().unwrap();
    let asc = apply(&rows, "", |row| row.achieved_at, SortDirection::Ascending);
    let desc = apply(&rows, "", |row| row.achieved_at, SortDirection::Descending);
    let mut reversed: Vec<i64> = asc.iter().map(|row| row.id).collect();
    reversed.reverse();
    let got: Vec<i64> = desc.iter().map(|row| row.id).collect();
    assert_eq!(got, reversed);
}

#[test]
fn sort_is_deterministic_for_equal_keys() {
    let service = InMemoryService::new_with_sample();
    let mut rows = service.list_achievements().unwrap();
    // Force a tie on the sort field; ordering must fall back to the id.
    let shared = rows[0].achieved_at;
    for row in &mut rows {
        row.achieved_at = shared;
    }
    let mut shuffled = rows.clone();
    shuffled.reverse();
    let a = apply(&rows, "", |row| row.achieved_at, SortDirection::Ascending);
    let b = apply(&shuffled, "", |row| row.achieved_at, SortDirection::Ascending);
    let ids_a: Vec<i64> = a.iter().map(|row| row.id).collect();
    let ids_b: Vec<i64> = b.iter().map(|row| row.id).collect();
    assert_eq!(ids_a, ids_b);
}
