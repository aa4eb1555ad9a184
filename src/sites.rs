//! Known job boards and the selectors that locate each field on them.
//!
//! Adding a site is a data change: append a [`SiteProfile`] to [`REGISTRY`].

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Company,
    Location,
    Description,
    Salary,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Title,
        Field::Company,
        Field::Location,
        Field::Description,
        Field::Salary,
    ];
}

#[derive(Debug)]
pub struct SiteProfile {
    pub id: &'static str,
    /// Matched as a substring of the lowercased host.
    pub domain: &'static str,
    pub fields: &'static [(Field, &'static [&'static str])],
}

impl SiteProfile {
    /// Ordered selector fallbacks for one field.
    pub fn selectors(&self, field: Field) -> &'static [&'static str] {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, sels)| *sels)
            .unwrap_or(&[])
    }
}

pub static REGISTRY: &[SiteProfile] = &[
    SiteProfile {
        id: "linkedin",
        domain: "linkedin.com",
        fields: &[
            (
                Field::Title,
                &[
                    "h1",
                    ".job-details-jobs-unified-top-card__job-title",
                    ".top-card-layout__title",
                ],
            ),
            (
                Field::Company,
                &[
                    ".job-details-jobs-unified-top-card__company-name",
                    ".top-card-layout__company-name",
                ],
            ),
            (
                Field::Location,
                &[
                    ".job-details-jobs-unified-top-card__bullet",
                    ".top-card-layout__location",
                ],
            ),
            (
                Field::Description,
                &[
                    ".job-details-jobs-unified-top-card__job-description",
                    ".description__text",
                ],
            ),
            (
                Field::Salary,
                &[
                    ".job-details-jobs-unified-top-card__salary-info",
                    ".compensation__salary",
                ],
            ),
        ],
    },
    SiteProfile {
        id: "indeed",
        domain: "indeed.com",
        fields: &[
            (Field::Title, &["h1", ".jobsearch-JobInfoHeader-title"]),
            (
                Field::Company,
                &[".jobsearch-JobInfoHeader-companyName", ".companyName"],
            ),
            (
                Field::Location,
                &[".jobsearch-JobInfoHeader-companyLocation", ".location"],
            ),
            (
                Field::Description,
                &[".jobsearch-jobDescriptionText", "#jobDescriptionText"],
            ),
            (
                Field::Salary,
                &[".jobsearch-JobInfoHeader-salary", ".salary-snippet"],
            ),
        ],
    },
    SiteProfile {
        id: "glassdoor",
        domain: "glassdoor.com",
        fields: &[
            (Field::Title, &["h1", ".job-title"]),
            (Field::Company, &[".employer-name", ".company-name"]),
            (Field::Location, &[".location", ".job-location"]),
            (Field::Description, &[".jobDescriptionContent", ".desc"]),
            (Field::Salary, &[".salary-estimate", ".salary"]),
        ],
    },
    SiteProfile {
        id: "microsoft",
        domain: "careers.microsoft.com",
        fields: &[
            (Field::Title, &["h1", ".job-title", ".title"]),
            (
                Field::Company,
                &[".company-name", ".employer", ".organization"],
            ),
            (
                Field::Location,
                &[".location", ".job-location", ".work-location"],
            ),
            (
                Field::Description,
                &[".job-description", ".description", ".content"],
            ),
            (Field::Salary, &[".salary", ".compensation", ".pay"]),
        ],
    },
];

/// Look up the profile for a URL's host. First registry match wins.
pub fn classify(url: &Url) -> Option<&'static SiteProfile> {
    let host = url.host_str()?.to_lowercase();
    let profile = REGISTRY.iter().find(|p| host.contains(p.domain));
    match profile {
        Some(p) => tracing::debug!(host = %host, site = p.id, "classified known job board"),
        None => tracing::debug!(host = %host, "no site profile, using generic extraction"),
    }
    profile
}
