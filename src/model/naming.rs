//! Accessor to property name conventions.

/// Convention mapping a declared accessor to its storage property name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PropertyNaming {
    /// Getter-style accessors: `getFoo`/`isFoo` and `get_foo`/`is_foo` map to `foo`.
    #[default]
    Accessor,
    /// The accessor name is the property name.
    Verbatim,
}

impl PropertyNaming {
    /// Resolve an accessor to a property name.
    ///
    /// Returns `None` if the accessor does not follow the convention.
    pub fn property_name(self, accessor: &str) -> Option<String> {
        match self {
            PropertyNaming::Verbatim => {
                if accessor.is_empty() || accessor.chars().any(char::is_whitespace) {
                    None
                } else {
                    Some(accessor.to_string())
                }
            }
            PropertyNaming::Accessor => getter_property(accessor),
        }
    }
}

fn getter_property(accessor: &str) -> Option<String> {
    for prefix in ["get_", "is_"] {
        if let Some(rest) = accessor.strip_prefix(prefix) {
            return valid_identifier(rest).then(|| rest.to_string());
        }
    }

    for prefix in ["get", "is"] {
        if let Some(rest) = accessor.strip_prefix(prefix) {
            if rest.starts_with(|c: char| c.is_ascii_uppercase()) && valid_identifier(rest) {
                return Some(decapitalize(rest));
            }
        }
    }

    None
}

fn valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

/// Lower-case the first character, leaving acronyms (`URL`) intact.
fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => {
            name.to_string()
        }
        (Some(first), _) => {
            let mut out: String = first.to_lowercase().collect();
            out.push_str(&name[first.len_utf8()..]);
            out
        }
        (None, _) => String::new(),
    }
}
