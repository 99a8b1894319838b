/// Hosts of job boards and applicant-tracking systems
///
/// A page on one of these hosts is published by the platform on behalf of an employer,
/// so the host name says nothing about who is hiring. Each entry also covers its
/// subdomains (`jobs.lever.co` matches `lever.co`).
const JOB_PLATFORM_HOSTS: &[&str] = &[
    "arbeitsagentur.de",
    "stepstone.de",
    "stepstone.at",
    "indeed.com",
    "indeed.de",
    "linkedin.com",
    "xing.com",
    "monster.de",
    "glassdoor.com",
    "glassdoor.de",
    "kununu.com",
    "jobware.de",
    "stellenanzeigen.de",
    "greenhouse.io",
    "lever.co",
    "myworkdayjobs.com",
    "workday.com",
    "smartrecruiters.com",
    "personio.de",
    "personio.com",
    "softgarden.io",
    "softgarden.de",
    "join.com",
    "recruitee.com",
    "workable.com",
    "bamboohr.com",
    "successfactors.com",
    "successfactors.eu",
    "ashbyhq.com",
    "breezy.hr",
    "teamtailor.com",
    "dvinci-hr.com",
    "rexx-systems.com",
    "onlyfy.jobs",
    "jobvite.com",
    "icims.com",
    "taleo.net",
];

/// Removes a leading `www.` label
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Returns true if `host` equals `base` or is one of its subdomains
pub fn host_matches(host: &str, base: &str) -> bool {
    let host = host.trim_end_matches('.');
    host == base
        || host
            .strip_suffix(base)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Returns true if the host belongs to a job board or applicant-tracking system
pub fn is_job_platform_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    JOB_PLATFORM_HOSTS
        .iter()
        .any(|base| host_matches(&host, base))
}

/// Derives a company name from an employer's own host name
///
/// Strips `www.`, drops the top-level domain, replaces `-` and `.` with spaces and
/// title-cases the words: `www.acme-robotics.de` becomes `Acme Robotics`.
/// Returns `None` for job-board and ATS hosts, IP addresses and single-label hosts.
pub fn company_from_domain(host: &str) -> Option<String> {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if is_job_platform_host(&host) || host.parse::<std::net::IpAddr>().is_ok() {
        return None;
    }

    let host = strip_www(&host);
    let (name, _tld) = host.rsplit_once('.')?;

    let words: Vec<String> = name
        .split(['-', '.'])
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
