/// Model attribute holding the link target.
pub const LINK_HREF: &str = "linkHref";

const DECORATOR_PREFIX: &str = "link";

/// `isExternal` -> `linkIsExternal`.
pub fn decorator_attribute_key(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => format!("{DECORATOR_PREFIX}{}{}", first.to_uppercase(), chars.as_str()),
        None => DECORATOR_PREFIX.to_string(),
    }
}

/// `linkIsExternal` -> `isExternal`. Returns `None` for keys outside the
/// `link*` namespace.
pub fn decorator_id_from_key(key: &str) -> Option<String> {
    let rest = key.strip_prefix(DECORATOR_PREFIX)?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_uppercase() {
        return None;
    }
    Some(format!("{}{}", first.to_lowercase(), chars.as_str()))
}
