//! Local Fallback Generator
//!
//! Deterministic task templates picked by keyword. Used whenever the
//! generation service can't produce a usable answer, so it never fails.

use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};
use tracing::debug;

/// Which template a goal text maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackTemplate {
    Software,
    Website,
    Generic,
}

/// One template row: title, description, start day, end day, prerequisite titles
type Step = (&'static str, &'static str, i64, i64, &'static [&'static str]);

const SOFTWARE: &[Step] = &[
    (
        "Requirements Analysis",
        "Define the requirements and specifications for the application",
        0,
        3,
        &[],
    ),
    (
        "Design UI/UX",
        "Create wireframes and design the user interface",
        3,
        7,
        &["Requirements Analysis"],
    ),
    (
        "Develop Backend",
        "Implement server-side logic and database",
        7,
        14,
        &["Requirements Analysis"],
    ),
    (
        "Develop Frontend",
        "Implement client-side features and UI components",
        7,
        14,
        &["Design UI/UX"],
    ),
    (
        "Integration",
        "Connect frontend and backend components",
        14,
        17,
        &["Develop Backend", "Develop Frontend"],
    ),
    ("Testing", "Perform unit and integration testing", 17, 20, &["Integration"]),
    ("Deployment", "Deploy the application to production", 20, 21, &["Testing"]),
];

const WEBSITE: &[Step] = &[
    ("Content Planning", "Plan the content and structure of the website", 0, 3, &[]),
    ("Design Mockups", "Create visual designs and mockups", 3, 7, &["Content Planning"]),
    (
        "HTML/CSS Development",
        "Implement the frontend structure and styling",
        7,
        12,
        &["Design Mockups"],
    ),
    (
        "JavaScript Functionality",
        "Add interactive features and functionality",
        12,
        16,
        &["HTML/CSS Development"],
    ),
    (
        "Testing",
        "Test the website on different browsers and devices",
        16,
        19,
        &["JavaScript Functionality"],
    ),
    ("Deployment", "Launch the website on a hosting platform", 19, 21, &["Testing"]),
];

const GENERIC: &[Step] = &[
    ("Research", "Research and gather information about the project", 0, 5, &[]),
    ("Planning", "Create a detailed plan with milestones", 5, 8, &["Research"]),
    (
        "Implementation Phase 1",
        "Begin implementing the core components",
        8,
        13,
        &["Planning"],
    ),
    (
        "Implementation Phase 2",
        "Continue implementation with additional features",
        13,
        18,
        &["Implementation Phase 1"],
    ),
    (
        "Review and Testing",
        "Review the work and test for quality",
        18,
        20,
        &["Implementation Phase 2"],
    ),
    (
        "Finalization",
        "Finalize the project and prepare for delivery",
        20,
        21,
        &["Review and Testing"],
    ),
];

impl FallbackTemplate {
    /// Pick a template from the goal text, case-insensitively
    pub fn classify(goal_text: &str) -> Self {
        let text = goal_text.to_lowercase();
        if ["app", "application", "software"].iter().any(|k| text.contains(k)) {
            Self::Software
        } else if ["website", "web"].iter().any(|k| text.contains(k)) {
            Self::Website
        } else {
            Self::Generic
        }
    }

    fn steps(self) -> &'static [Step] {
        match self {
            Self::Software => SOFTWARE,
            Self::Website => WEBSITE,
            Self::Generic => GENERIC,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Software => "software",
            Self::Website => "website",
            Self::Generic => "generic",
        }
    }
}

/// Produce the template tasks for a goal, dated from `today`
///
/// Entries have the same loose shape the generator returns, so they go through
/// the normalizer like any other candidate. Every dependency names an earlier
/// entry. The deadline doesn't change the offsets.
pub fn generate_fallback(goal_text: &str, deadline: Option<DateTime<Utc>>, today: DateTime<Utc>) -> Vec<Value> {
    let template = FallbackTemplate::classify(goal_text);
    debug!(template = template.as_str(), ?deadline, %today, "generate_fallback: called");

    template
        .steps()
        .iter()
        .map(|(title, description, start, end, deps)| {
            json!({
                "title": title,
                "description": description,
                "startDate": (today + Duration::days(*start)).to_rfc3339(),
                "endDate": (today + Duration::days(*end)).to_rfc3339(),
                "dependencies": deps,
            })
        })
        .collect()
}
