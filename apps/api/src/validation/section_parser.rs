//! CV section parser — segments raw text into logical resume sections.
//!
//! A single forward scan over lines. Each line is tested against a fixed
//! synonym table per section kind using exact matching after trimming and
//! lowercasing; there is no regex anywhere in this module, so runtime is
//! linear in input length no matter what the document contains.

use chrono::Utc;

use crate::config::{DuplicateHeadingPolicy, ValidationConfig};
use crate::models::cv::{CVMetadata, CVSection, CVSectionType, ParsedCV};
use crate::validation::guard::GuardedText;

/// Recognized heading spellings per section kind. Matching is exact against
/// the normalized candidate line (lowercased, surrounding punctuation
/// stripped, inner whitespace collapsed).
const HEADING_SYNONYMS: &[(CVSectionType, &[&str])] = &[
    (
        CVSectionType::PersonalInfo,
        &[
            "personal information",
            "personal details",
            "contact",
            "contact information",
            "contact details",
        ],
    ),
    (
        CVSectionType::Summary,
        &[
            "summary",
            "professional summary",
            "executive summary",
            "profile",
            "professional profile",
            "objective",
            "career objective",
            "about",
            "about me",
        ],
    ),
    (
        CVSectionType::Experience,
        &[
            "experience",
            "work experience",
            "professional experience",
            "employment",
            "employment history",
            "work history",
            "career history",
            "relevant experience",
        ],
    ),
    (
        CVSectionType::Education,
        &[
            "education",
            "academic background",
            "academic history",
            "education and training",
            "qualifications",
        ],
    ),
    (
        CVSectionType::Skills,
        &[
            "skills",
            "technical skills",
            "core competencies",
            "competencies",
            "key skills",
            "skills & abilities",
            "technologies",
            "areas of expertise",
        ],
    ),
    (
        CVSectionType::Certifications,
        &[
            "certifications",
            "certificates",
            "licenses",
            "licenses and certifications",
            "licenses & certifications",
        ],
    ),
    (
        CVSectionType::Projects,
        &[
            "projects",
            "personal projects",
            "key projects",
            "selected projects",
            "academic projects",
        ],
    ),
    (
        CVSectionType::Awards,
        &[
            "awards",
            "honors",
            "honors and awards",
            "honors & awards",
            "achievements",
            "accomplishments",
        ],
    ),
    (
        CVSectionType::Publications,
        &[
            "publications",
            "selected publications",
            "research publications",
            "papers",
        ],
    ),
    (
        CVSectionType::Languages,
        &["languages", "language skills", "language proficiency"],
    ),
    (
        CVSectionType::Interests,
        &[
            "interests",
            "hobbies",
            "hobbies and interests",
            "hobbies & interests",
            "activities",
        ],
    ),
    (
        CVSectionType::References,
        &["references", "referees", "references available upon request"],
    ),
];

/// Tests whether a line is a section heading. Candidate lines must be short
/// (below `max_chars`) so body text can never be promoted to a heading.
/// Returns the section kind and the literal (trimmed) heading text.
fn match_heading(line: &str, max_chars: usize) -> Option<(CVSectionType, String)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.chars().count() > max_chars {
        return None;
    }

    // "— EXPERIENCE —", "SKILLS:", "• Education •" all reduce to the bare title.
    let stripped = trimmed.trim_matches(|c: char| !c.is_alphanumeric());
    if stripped.is_empty() {
        return None;
    }
    let normalized = stripped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    for (kind, synonyms) in HEADING_SYNONYMS {
        if synonyms.iter().any(|s| *s == normalized) {
            return Some((*kind, trimmed.to_string()));
        }
    }
    None
}

/// A section being accumulated during the scan.
struct OpenBlock {
    section_type: CVSectionType,
    title: String,
    start_line: usize,
    content_lines: Vec<String>,
    /// True for the preamble block that exists before any heading is seen.
    is_implicit: bool,
}

impl OpenBlock {
    fn implicit() -> Self {
        Self {
            section_type: CVSectionType::PersonalInfo,
            title: String::new(),
            start_line: 0,
            content_lines: Vec::new(),
            is_implicit: true,
        }
    }

    fn from_heading(section_type: CVSectionType, title: String, start_line: usize) -> Self {
        Self {
            section_type,
            title,
            start_line,
            content_lines: Vec::new(),
            is_implicit: false,
        }
    }
}

/// Segments the document into sections.
///
/// Text before the first detected heading becomes an implicit `personal_info`
/// section; a document with no headings at all (including the empty string)
/// becomes a single `personal_info` section holding the whole text. Duplicate
/// headings follow `cfg.duplicate_heading_policy`. Never fails.
pub fn parse_cv(
    text: &GuardedText,
    file_name: &str,
    file_type: &str,
    file_size_bytes: u64,
    cfg: &ValidationConfig,
) -> ParsedCV {
    let lines: Vec<&str> = text.as_str().split('\n').collect();
    let mut sections: Vec<CVSection> = Vec::new();
    let mut next_order = 0usize;
    let mut saw_heading = false;
    let mut open = OpenBlock::implicit();

    for (idx, line) in lines.iter().enumerate() {
        if let Some((kind, title)) = match_heading(line, cfg.heading_max_chars) {
            let closed = std::mem::replace(&mut open, OpenBlock::from_heading(kind, title, idx));
            close_block(
                closed,
                idx.saturating_sub(1),
                true,
                &mut sections,
                cfg.duplicate_heading_policy,
                &mut next_order,
            );
            saw_heading = true;
        } else {
            open.content_lines.push((*line).to_string());
        }
    }
    close_block(
        open,
        lines.len().saturating_sub(1),
        saw_heading,
        &mut sections,
        cfg.duplicate_heading_policy,
        &mut next_order,
    );

    ParsedCV {
        sections,
        raw_text: text.as_str().to_string(),
        metadata: CVMetadata {
            file_name: file_name.to_string(),
            file_type: file_type.to_string(),
            file_size_bytes,
            extracted_at: Utc::now(),
        },
    }
}

fn close_block(
    block: OpenBlock,
    end_line: usize,
    saw_heading: bool,
    sections: &mut Vec<CVSection>,
    policy: DuplicateHeadingPolicy,
    next_order: &mut usize,
) {
    // A blank preamble before the first heading is noise, not a section.
    // Without any heading the preamble is the whole document and is kept
    // even when empty.
    if block.is_implicit
        && saw_heading
        && block.content_lines.iter().all(|l| l.trim().is_empty())
    {
        return;
    }

    let content = block.content_lines.join("\n");

    if policy == DuplicateHeadingPolicy::MergeIntoFirst {
        if let Some(existing) = sections
            .iter_mut()
            .find(|s| s.section_type == block.section_type)
        {
            if !content.trim().is_empty() {
                if existing.content.is_empty() {
                    existing.content = content;
                } else {
                    existing.content.push('\n');
                    existing.content.push_str(&content);
                }
            }
            return;
        }
    }

    sections.push(CVSection {
        section_type: block.section_type,
        title: block.title,
        content,
        start_line: Some(block.start_line),
        end_line: Some(end_line.max(block.start_line)),
        order: Some(*next_order),
    });
    *next_order += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::guard::guard;

    fn parse(text: &str, cfg: &ValidationConfig) -> ParsedCV {
        let guarded = guard(text, text.len() as u64, cfg.max_text_chars).unwrap();
        parse_cv(&guarded, "cv.txt", "txt", text.len() as u64, cfg)
    }

    const BASIC_CV: &str = "Jane Doe\njane@example.com\n\nEXPERIENCE\nAcme Corp, 2019-2024\nShipped things\n\nEDUCATION\nBSc Computer Science\n\nSKILLS\nRust, SQL";

    #[test]
    fn test_basic_document_segments_into_sections() {
        let parsed = parse(BASIC_CV, &ValidationConfig::default());
        let types: Vec<_> = parsed.sections.iter().map(|s| s.section_type).collect();
        assert_eq!(
            types,
            vec![
                CVSectionType::PersonalInfo,
                CVSectionType::Experience,
                CVSectionType::Education,
                CVSectionType::Skills
            ]
        );
        let orders: Vec<_> = parsed.sections.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![Some(0), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_preamble_becomes_personal_info() {
        let parsed = parse(BASIC_CV, &ValidationConfig::default());
        let personal = parsed.section(CVSectionType::PersonalInfo).unwrap();
        assert!(personal.content.contains("jane@example.com"));
        assert_eq!(personal.start_line, Some(0));
        assert_eq!(personal.title, "");
    }

    #[test]
    fn test_line_ranges_cover_heading_and_content() {
        let parsed = parse(BASIC_CV, &ValidationConfig::default());
        let experience = parsed.section(CVSectionType::Experience).unwrap();
        assert_eq!(experience.start_line, Some(3));
        assert_eq!(experience.end_line, Some(6));
        assert!(experience.content.contains("Acme Corp"));
    }

    #[test]
    fn test_heading_matching_is_case_insensitive_and_strips_punctuation() {
        let text = "work experience:\nAcme\n\n• Skills •\nRust\n\n— EDUCATION —\nBSc";
        let parsed = parse(text, &ValidationConfig::default());
        let types = parsed.detected_types();
        assert!(types.contains(&CVSectionType::Experience));
        assert!(types.contains(&CVSectionType::Skills));
        assert!(types.contains(&CVSectionType::Education));
    }

    #[test]
    fn test_body_text_mentioning_section_words_is_not_a_heading() {
        let text = "EXPERIENCE\nGained significant experience working on education software and skills training platforms for enterprise clients\nMore detail";
        let parsed = parse(text, &ValidationConfig::default());
        assert_eq!(parsed.detected_types(), vec![CVSectionType::Experience]);
        assert_eq!(parsed.sections.len(), 1);
    }

    #[test]
    fn test_long_heading_like_line_is_rejected_by_length_cap() {
        let long = format!("EXPERIENCE{}", " ".repeat(70));
        // Trailing spaces are trimmed, so pad with visible text instead.
        let text = format!("{}AND MANY MORE WORDS THAT MAKE THIS LINE FAR TOO LONG TO BE A SECTION HEADING\nbody", long);
        let parsed = parse(&text, &ValidationConfig::default());
        assert_eq!(parsed.detected_types(), vec![CVSectionType::PersonalInfo]);
    }

    #[test]
    fn test_no_headings_falls_back_to_single_personal_info() {
        let text = "Just a plain paragraph\nwith two lines";
        let parsed = parse(text, &ValidationConfig::default());
        assert_eq!(parsed.sections.len(), 1);
        assert_eq!(
            parsed.sections[0].section_type,
            CVSectionType::PersonalInfo
        );
        assert_eq!(parsed.sections[0].content, text);
    }

    #[test]
    fn test_empty_document_yields_one_empty_personal_info_section() {
        let parsed = parse("", &ValidationConfig::default());
        assert_eq!(parsed.sections.len(), 1);
        assert_eq!(
            parsed.sections[0].section_type,
            CVSectionType::PersonalInfo
        );
        assert_eq!(parsed.sections[0].content, "");
    }

    #[test]
    fn test_blank_preamble_before_first_heading_is_dropped() {
        let text = "\n\nEXPERIENCE\nAcme";
        let parsed = parse(text, &ValidationConfig::default());
        assert_eq!(parsed.detected_types(), vec![CVSectionType::Experience]);
    }

    #[test]
    fn test_duplicate_headings_merge_into_first_by_default() {
        let text = "EXPERIENCE\nAcme Corp\n\nEDUCATION\nBSc\n\nEXPERIENCE\nBeta Inc";
        let parsed = parse(text, &ValidationConfig::default());
        assert_eq!(
            parsed.detected_types(),
            vec![CVSectionType::Experience, CVSectionType::Education]
        );
        let experience = parsed.section(CVSectionType::Experience).unwrap();
        assert!(experience.content.contains("Acme Corp"));
        assert!(experience.content.contains("Beta Inc"));
    }

    #[test]
    fn test_duplicate_headings_kept_separate_under_policy() {
        let cfg = ValidationConfig {
            duplicate_heading_policy: DuplicateHeadingPolicy::SeparateSections,
            ..ValidationConfig::default()
        };
        let text = "EXPERIENCE\nAcme Corp\n\nEXPERIENCE\nBeta Inc";
        let parsed = parse(text, &cfg);
        assert_eq!(parsed.sections.len(), 2);
        assert_eq!(parsed.sections[0].order, Some(0));
        assert_eq!(parsed.sections[1].order, Some(1));
        assert!(parsed.sections[0].content.contains("Acme Corp"));
        assert!(parsed.sections[1].content.contains("Beta Inc"));
    }

    #[test]
    fn test_repeated_heading_lines_terminate_and_collapse() {
        let text = "EXPERIENCE\n".repeat(1000);
        let parsed = parse(&text, &ValidationConfig::default());
        // 999 merges plus the trailing empty line; still a single section.
        assert_eq!(parsed.detected_types(), vec![CVSectionType::Experience]);
    }

    #[test]
    fn test_repeated_token_single_line_is_body_text() {
        let text = "EXPERIENCE ".repeat(1000);
        let parsed = parse(&text, &ValidationConfig::default());
        assert_eq!(parsed.detected_types(), vec![CVSectionType::PersonalInfo]);
    }

    #[test]
    fn test_nested_bracket_runs_do_not_blow_up() {
        let text = format!("{}EXPERIENCE{}", "(".repeat(5000), ")".repeat(5000));
        let parsed = parse(&text, &ValidationConfig::default());
        // One long line, far above the heading cap: plain body text.
        assert_eq!(parsed.detected_types(), vec![CVSectionType::PersonalInfo]);
    }
}
