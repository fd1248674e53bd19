use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The canonical resume section kinds the parser can attribute text to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CVSectionType {
    PersonalInfo,
    Summary,
    Experience,
    Education,
    Skills,
    Certifications,
    Projects,
    Awards,
    Publications,
    Languages,
    Interests,
    References,
}

impl CVSectionType {
    /// The relative sequence most ATS parsers assume, used as the default
    /// expected ordering.
    pub const CANONICAL_ORDER: [CVSectionType; 12] = [
        CVSectionType::PersonalInfo,
        CVSectionType::Summary,
        CVSectionType::Experience,
        CVSectionType::Education,
        CVSectionType::Skills,
        CVSectionType::Certifications,
        CVSectionType::Projects,
        CVSectionType::Awards,
        CVSectionType::Publications,
        CVSectionType::Languages,
        CVSectionType::Interests,
        CVSectionType::References,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CVSectionType::PersonalInfo => "personal_info",
            CVSectionType::Summary => "summary",
            CVSectionType::Experience => "experience",
            CVSectionType::Education => "education",
            CVSectionType::Skills => "skills",
            CVSectionType::Certifications => "certifications",
            CVSectionType::Projects => "projects",
            CVSectionType::Awards => "awards",
            CVSectionType::Publications => "publications",
            CVSectionType::Languages => "languages",
            CVSectionType::Interests => "interests",
            CVSectionType::References => "references",
        }
    }
}

impl std::fmt::Display for CVSectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A contiguous block of the document attributed to one section kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CVSection {
    pub section_type: CVSectionType,
    /// The literal heading line that opened this section (trimmed). Empty for
    /// the implicit preamble section.
    pub title: String,
    pub content: String,
    pub start_line: Option<usize>,
    pub end_line: Option<usize>,
    /// Position among detected sections, 0-based, in document order.
    pub order: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CVMetadata {
    pub file_name: String,
    pub file_type: String,
    pub file_size_bytes: u64,
    pub extracted_at: DateTime<Utc>,
}

/// The parsed document: sections in document order plus the untouched raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCV {
    pub sections: Vec<CVSection>,
    pub raw_text: String,
    pub metadata: CVMetadata,
}

impl ParsedCV {
    /// Section kinds in document order, first occurrence only.
    pub fn detected_types(&self) -> Vec<CVSectionType> {
        let mut seen = Vec::new();
        for section in &self.sections {
            if !seen.contains(&section.section_type) {
                seen.push(section.section_type);
            }
        }
        seen
    }

    pub fn section(&self, section_type: CVSectionType) -> Option<&CVSection> {
        self.sections
            .iter()
            .find(|s| s.section_type == section_type)
    }
}
