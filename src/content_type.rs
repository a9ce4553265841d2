//! Per content-type defaults used when generated text carries no usable structure.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentProfile {
    pub key: &'static str,
    pub report_title: &'static str,
    pub section_titles: &'static [&'static str],
}

pub const DEFAULT_PROFILE: ContentProfile = ContentProfile {
    key: "default",
    report_title: "Professional Analysis",
    section_titles: &["Overview", "Analysis", "Key Points", "Summary"],
};

pub const PROFILES: &[ContentProfile] = &[
    ContentProfile {
        key: "sustainability",
        report_title: "Sustainability Analysis Report",
        section_titles: &[
            "Overview",
            "Environmental Impact",
            "Recommendations",
            "Implementation",
        ],
    },
    ContentProfile {
        key: "technical",
        report_title: "Technical Analysis Report",
        section_titles: &[
            "Overview",
            "Technical Details",
            "Performance Metrics",
            "Recommendations",
        ],
    },
    ContentProfile {
        key: "performance",
        report_title: "Performance Analysis Report",
        section_titles: &[
            "Overview",
            "Performance Metrics",
            "Bottlenecks",
            "Optimization Opportunities",
        ],
    },
    ContentProfile {
        key: "security",
        report_title: "Security Analysis Report",
        section_titles: &[
            "Overview",
            "Security Assessment",
            "Vulnerabilities",
            "Remediation",
        ],
    },
    ContentProfile {
        key: "business",
        report_title: "Business Impact Report",
        section_titles: &[
            "Executive Summary",
            "Business Impact",
            "Opportunities",
            "Next Steps",
        ],
    },
    ContentProfile {
        key: "blog",
        report_title: "Website Insights",
        section_titles: &["Introduction", "Key Findings", "What It Means", "Takeaways"],
    },
];

/// Looks up the profile for a content type, ignoring case and surrounding whitespace.
pub fn profile_for(content_type: &str) -> &'static ContentProfile {
    let key = content_type.trim();
    PROFILES
        .iter()
        .find(|p| p.key.eq_ignore_ascii_case(key))
        .unwrap_or(&DEFAULT_PROFILE)
}

impl ContentProfile {
    /// Default title for the section at `index`, numbering past the end of the list.
    pub fn section_title(&self, index: usize) -> String {
        match self.section_titles.get(index) {
            Some(title) => (*title).to_owned(),
            None => format!("Section {}", index + 1),
        }
    }
}
