use uuid::Uuid;

/// Fabricate an opaque share link for the current task list.
///
/// Placeholder: the id has no backing resource, so the link identifies
/// nothing and resolves nowhere.
pub fn share_link(origin: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{origin}/shared/{}", &id[..8])
}
