// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/// Lower-case, trim, strip the trailing root dot
pub fn normalize(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Registrable domain of `name` according to the Public Suffix List.
/// Names with no registrable part (a bare suffix, a single label) are their own apex.
pub fn apex_of(name: &str) -> String {
    let name = normalize(name);
    match psl::domain_str(&name) {
        Some(domain) => domain.to_string(),
        None => name,
    }
}
