//! Contact email selection

/// Local parts that belong to system mailboxes rather than people
const SYSTEM_LOCAL_PARTS: &[&str] = &[
    "noreply",
    "no-reply",
    "no_reply",
    "donotreply",
    "do-not-reply",
    "mailer-daemon",
    "postmaster",
    "webmaster",
    "datenschutz",
    "privacy",
    "abuse",
    "newsletter",
];

/// Domains that never belong to a real contact
const PLACEHOLDER_DOMAINS: &[&str] = &[
    "example.com",
    "example.org",
    "example.net",
    "sentry.io",
    "wixpress.com",
    "domain.com",
];

/// Local-part fragments of recruiting mailboxes
const RECRUITING_KEYWORDS: &[&str] = &[
    "bewerbung",
    "bewerber",
    "jobs",
    "job",
    "karriere",
    "career",
    "recruiting",
    "recruitment",
    "hr",
    "personal",
    "talent",
    "apply",
];

const FILE_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"];

/// Short keywords must match a whole local-part segment (`hr@`, not `christian@`)
fn is_recruiting_mailbox(local: &str) -> bool {
    local
        .split(['.', '-', '_', '+'])
        .any(|segment| {
            RECRUITING_KEYWORDS.iter().any(|keyword| {
                if keyword.len() <= 3 {
                    segment == *keyword
                } else {
                    segment.contains(keyword)
                }
            })
        })
}

/// Checks an address against a board denylist
///
/// Entries starting with `@` deny a domain and its subdomains; other entries deny one
/// exact address.
fn board_denies(email: &str, denylist: &[&str]) -> bool {
    denylist.iter().any(|entry| match entry.strip_prefix('@') {
        Some(domain) => email
            .rsplit_once('@')
            .is_some_and(|(_, host)| crate::url::host_matches(host, domain)),
        None => email == *entry,
    })
}

/// Returns true if the address may be reported as a contact
pub fn is_contact_candidate(email: &str, denylist: &[&str]) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || !domain.contains('.') {
        return false;
    }
    if FILE_SUFFIXES.iter().any(|suffix| email.ends_with(suffix)) {
        return false;
    }
    if SYSTEM_LOCAL_PARTS.iter().any(|system| local.contains(system)) {
        return false;
    }
    if PLACEHOLDER_DOMAINS
        .iter()
        .any(|placeholder| crate::url::host_matches(domain, placeholder))
    {
        return false;
    }
    !board_denies(email, denylist)
}

/// Picks the contact email from candidate addresses
///
/// Addresses are lowercased and filtered through the system denylist and the board's
/// denylist. The first recruiting mailbox wins, otherwise the first remaining address.
pub fn select_contact_email<'a, I>(candidates: I, denylist: &[&str]) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut allowed: Vec<String> = Vec::new();
    for candidate in candidates {
        let email = candidate.trim().trim_end_matches('.').to_lowercase();
        if is_contact_candidate(&email, denylist) && !allowed.contains(&email) {
            allowed.push(email);
        }
    }

    let recruiting = allowed.iter().position(|email| {
        email
            .split('@')
            .next()
            .is_some_and(is_recruiting_mailbox)
    });

    match recruiting {
        Some(index) => Some(allowed.swap_remove(index)),
        None => allowed.into_iter().next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_system_addresses() {
        assert!(!is_contact_candidate("noreply@acme.de", &[]));
        assert!(!is_contact_candidate("datenschutz@acme.de", &[]));
        assert!(!is_contact_candidate("someone@example.com", &[]));
        assert!(!is_contact_candidate("logo@2x.png", &[]));
        assert!(is_contact_candidate("anna.schmidt@acme.de", &[]));
    }

    #[test]
    fn test_board_denylist() {
        let denylist = ["@stepstone.de", "service@arbeitsagentur.de"];
        assert!(!is_contact_candidate("kontakt@stepstone.de", &denylist));
        assert!(!is_contact_candidate("info@mail.stepstone.de", &denylist));
        assert!(!is_contact_candidate("service@arbeitsagentur.de", &denylist));
        assert!(is_contact_candidate("team@arbeitsagentur.de", &denylist));
    }

    #[test]
    fn test_prefers_recruiting_mailbox() {
        let picked = select_contact_email(
            ["info@acme.de", "noreply@acme.de", "Karriere@Acme.de"],
            &[],
        );
        assert_eq!(picked.as_deref(), Some("karriere@acme.de"));
    }

    #[test]
    fn test_falls_back_to_first_allowed() {
        let picked = select_contact_email(["privacy@acme.de", "info@acme.de"], &[]);
        assert_eq!(picked.as_deref(), Some("info@acme.de"));
        assert_eq!(select_contact_email(["noreply@acme.de"], &[]), None);
    }

    #[test]
    fn test_short_keywords_match_whole_segments() {
        let picked = select_contact_email(["christian@acme.de", "hr@acme.de"], &[]);
        assert_eq!(picked.as_deref(), Some("hr@acme.de"));
    }
}
