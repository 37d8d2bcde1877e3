use uuid::Uuid;

/// Deterministic UUIDv5 from an arbitrary string id.
pub fn stable_uuid(id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, id.as_bytes())
}

/// Deterministic UUIDv5 for an id scoped to a namespace.
///
/// The two parts are joined with a newline so `("a/b", "c")` and
/// `("a", "b/c")` never collide.
pub fn scoped_uuid(namespace: &str, id: &str) -> Uuid {
    stable_uuid(&format!("{namespace}\n{id}"))
}
