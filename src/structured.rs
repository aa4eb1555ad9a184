//! Selector-driven extraction for known job boards.

use scraper::Html;

use crate::dom::first_text;
use crate::models::PartialRecord;
use crate::sites::{Field, SiteProfile};

pub fn extract(document: &Html, profile: &SiteProfile) -> PartialRecord {
    let field = |f: Field| resolve_field(document, profile.selectors(f));
    PartialRecord {
        job_title: field(Field::Title),
        company: field(Field::Company),
        location: field(Field::Location),
        description: field(Field::Description),
        salary: field(Field::Salary),
        ..Default::default()
    }
}

/// Later selectors are fallbacks for the same field only.
fn resolve_field(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|css| first_text(document, css))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::REGISTRY;

    fn profile(id: &str) -> &'static SiteProfile {
        REGISTRY.iter().find(|p| p.id == id).unwrap()
    }

    #[test]
    fn test_first_non_empty_selector_wins() {
        let html = r#"
            <html><body>
              <h1>   </h1>
              <div class="jobsearch-JobInfoHeader-title">Platform Engineer</div>
              <div class="companyName">Initech</div>
              <div class="location">Austin, TX</div>
              <div id="jobDescriptionText">Build and run the deploy pipeline.</div>
            </body></html>"#;
        let doc = Html::parse_document(html);
        let partial = extract(&doc, profile("indeed"));
        assert_eq!(partial.job_title.as_deref(), Some("Platform Engineer"));
        assert_eq!(partial.company.as_deref(), Some("Initech"));
        assert_eq!(partial.location.as_deref(), Some("Austin, TX"));
        assert_eq!(
            partial.description.as_deref(),
            Some("Build and run the deploy pipeline.")
        );
        assert_eq!(partial.salary, None);
    }

    #[test]
    fn test_missing_company_stays_none() {
        let doc = Html::parse_document("<h1>Staff Engineer</h1><p>Some body text</p>");
        let partial = extract(&doc, profile("linkedin"));
        assert_eq!(partial.job_title.as_deref(), Some("Staff Engineer"));
        assert_eq!(partial.company, None);
        assert!(partial.has_minimal_fields());
    }

    #[test]
    fn test_selectors_do_not_cascade_across_fields() {
        // The title text must never satisfy the company field.
        let doc = Html::parse_document(r#"<h1 class="employer-name-x">Data Analyst</h1>"#);
        let partial = extract(&doc, profile("glassdoor"));
        assert_eq!(partial.job_title.as_deref(), Some("Data Analyst"));
        assert_eq!(partial.company, None);
    }
}
